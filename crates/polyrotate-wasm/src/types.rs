//! Conversion of JavaScript event objects and GeoJSON payloads.
//!
//! Map events arrive as the draw host's event objects
//! (`{ lngLat: { lng, lat }, originalEvent }`), keyboard events as DOM
//! `KeyboardEvent`s. GeoJSON crosses the boundary through
//! `serde-wasm-bindgen` using the JSON-compatible serializer, so properties
//! become plain objects rather than `Map`s.

use geojson::{Feature, Geometry};
use js_sys::{Function, Reflect};
use polyrotate_core::{KeyEvent, PointerEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Read a numeric property, failing with a descriptive message.
fn number_field(object: &JsValue, name: &str) -> Result<f64, JsValue> {
    Reflect::get(object, &JsValue::from_str(name))?
        .as_f64()
        .ok_or_else(|| JsValue::from_str(&format!("Event is missing numeric `{}`", name)))
}

/// Convert a map event into a core pointer event.
pub(crate) fn pointer_event(event: &JsValue) -> Result<PointerEvent, JsValue> {
    let lng_lat = Reflect::get(event, &JsValue::from_str("lngLat"))?;
    if lng_lat.is_undefined() || lng_lat.is_null() {
        return Err(JsValue::from_str("Event is missing `lngLat`"));
    }
    Ok(PointerEvent::new(
        number_field(&lng_lat, "lng")?,
        number_field(&lng_lat, "lat")?,
    ))
}

/// Stop the platform event wrapped by a map event from propagating.
pub(crate) fn stop_propagation(event: &JsValue) -> Result<(), JsValue> {
    let original = Reflect::get(event, &JsValue::from_str("originalEvent"))?;
    if original.is_undefined() || original.is_null() {
        return Ok(());
    }
    let stop: Function = Reflect::get(&original, &JsValue::from_str("stopPropagation"))?.dyn_into()?;
    stop.call0(&original)?;
    Ok(())
}

/// Convert a keyboard event into a core key event.
pub(crate) fn key_event(event: &JsValue) -> Result<KeyEvent, JsValue> {
    Reflect::get(event, &JsValue::from_str("key"))?
        .as_string()
        .map(KeyEvent::new)
        .ok_or_else(|| JsValue::from_str("Event is missing `key`"))
}

pub(crate) fn feature_from_js(value: JsValue) -> Result<Feature, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid GeoJSON feature: {}", e)))
}

pub(crate) fn feature_to_js(feature: &Feature) -> Result<JsValue, JsValue> {
    to_js(feature)
}

pub(crate) fn geometry_to_js(geometry: &Geometry) -> Result<JsValue, JsValue> {
    to_js(geometry)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to convert GeoJSON: {}", e)))
}

/// Options object passed to the host's `changeMode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeModeOptions {
    pub feature_ids: Vec<String>,
}

impl ChangeModeOptions {
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}
