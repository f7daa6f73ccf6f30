//! Bridge from the JavaScript draw host to the core `DrawContext` trait.
//!
//! The host passes an object exposing the draw capabilities under camelCase
//! names. With mapbox-gl-draw, the mode's `this` can be adapted like so:
//!
//! ```typescript
//! const host = {
//!   getFeature: (id) => this.getFeature(id)?.toGeoJSON(),
//!   setSelected: (ids) => this.setSelected(ids),
//!   newFeature: (geojson) => this.newFeature(geojson),
//!   addFeature: (feature) => this.addFeature(feature),
//!   deleteFeature: (id) => this.deleteFeature(id, { silent: true }),
//!   setFeatureGeometry: (id, geometry) =>
//!     this.getFeature(id).incomingCoords(geometry.coordinates),
//!   doRender: (id) => this.doRender(id),
//!   setDragPan: (enabled) =>
//!     enabled ? this.map.dragPan.enable() : this.map.dragPan.disable(),
//!   changeMode: (mode, opts) => this.changeMode(mode, opts),
//! };
//! ```
//!
//! Render requests and mode changes are queued and only sent to the host by
//! [`JsDrawContext::flush`], after the mode has released its session. A host
//! that renders or switches modes synchronously therefore never re-enters a
//! session that is still being mutated.

use std::collections::HashMap;

use geojson::{Feature, Geometry};
use js_sys::Array;
use polyrotate_core::geometry::feature_id;
use polyrotate_core::{DrawContext, FeatureId, ModeError};
use wasm_bindgen::prelude::*;

use crate::types::{feature_from_js, feature_to_js, geometry_to_js, ChangeModeOptions};

#[wasm_bindgen]
extern "C" {
    /// Draw capabilities supplied by the JavaScript host.
    pub type DrawHost;

    #[wasm_bindgen(method, js_name = getFeature)]
    fn get_feature(this: &DrawHost, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = setSelected)]
    fn set_selected(this: &DrawHost, ids: &Array);

    #[wasm_bindgen(method, catch, js_name = newFeature)]
    fn new_feature(this: &DrawHost, geojson: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addFeature)]
    fn add_feature(this: &DrawHost, feature: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = deleteFeature)]
    fn delete_feature(this: &DrawHost, id: &str);

    #[wasm_bindgen(method, catch, js_name = setFeatureGeometry)]
    fn set_feature_geometry(this: &DrawHost, id: &str, geometry: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = doRender)]
    fn do_render(this: &DrawHost, id: &str);

    #[wasm_bindgen(method, js_name = setDragPan)]
    fn set_drag_pan(this: &DrawHost, enabled: bool);

    #[wasm_bindgen(method, js_name = changeMode)]
    fn change_mode(this: &DrawHost, mode: &str, options: &JsValue);
}

fn host_error(err: JsValue) -> ModeError {
    ModeError::Host(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// `DrawContext` over a JavaScript host, valid for one hook invocation.
pub(crate) struct JsDrawContext<'a> {
    host: &'a DrawHost,
    /// Host handles created by `newFeature`, waiting for `addFeature`.
    handles: HashMap<FeatureId, JsValue>,
    renders: Vec<FeatureId>,
    mode_change: Option<(String, Vec<FeatureId>)>,
}

impl<'a> JsDrawContext<'a> {
    pub fn new(host: &'a DrawHost) -> Self {
        Self {
            host,
            handles: HashMap::new(),
            renders: Vec::new(),
            mode_change: None,
        }
    }

    /// Send queued render requests and mode changes to the host.
    pub fn flush(self) {
        for id in &self.renders {
            self.host.do_render(id);
        }

        if let Some((mode, feature_ids)) = self.mode_change {
            match (ChangeModeOptions { feature_ids }).to_js() {
                Ok(options) => self.host.change_mode(&mode, &options),
                Err(err) => web_sys::console::error_2(
                    &JsValue::from_str("polyrotate: could not build changeMode options"),
                    &err,
                ),
            }
        }
    }

    fn handle_for(&mut self, feature: &Feature) -> Result<JsValue, ModeError> {
        let id = feature_id(feature)
            .ok_or_else(|| ModeError::Host("features need an id".to_string()))?;
        if let Some(handle) = self.handles.remove(&id) {
            return Ok(handle);
        }
        let geojson = feature_to_js(feature).map_err(host_error)?;
        self.host.new_feature(&geojson).map_err(host_error)
    }
}

impl DrawContext for JsDrawContext<'_> {
    fn get_feature(&self, id: &str) -> Option<Feature> {
        let value = self.host.get_feature(id);
        if value.is_undefined() || value.is_null() {
            return None;
        }
        match feature_from_js(value) {
            Ok(feature) => Some(feature),
            Err(err) => {
                web_sys::console::warn_2(
                    &JsValue::from_str(&format!("polyrotate: feature {} is not valid GeoJSON", id)),
                    &err,
                );
                None
            }
        }
    }

    fn set_selected(&mut self, ids: &[FeatureId]) {
        let array: Array = ids.iter().map(|id| JsValue::from_str(id)).collect();
        self.host.set_selected(&array);
    }

    fn new_feature(&mut self, feature: Feature) -> Result<Feature, ModeError> {
        let id = feature_id(&feature)
            .ok_or_else(|| ModeError::Host("features need an id".to_string()))?;
        let geojson = feature_to_js(&feature).map_err(host_error)?;
        let handle = self.host.new_feature(&geojson).map_err(host_error)?;
        self.handles.insert(id, handle);
        Ok(feature)
    }

    fn add_feature(&mut self, feature: Feature) -> Result<(), ModeError> {
        let handle = self.handle_for(&feature)?;
        self.host.add_feature(&handle).map_err(host_error)
    }

    fn delete_feature(&mut self, id: &str) {
        self.handles.remove(id);
        self.host.delete_feature(id);
    }

    fn set_feature_geometry(&mut self, id: &str, geometry: Geometry) -> Result<(), ModeError> {
        let geometry = geometry_to_js(&geometry).map_err(host_error)?;
        self.host
            .set_feature_geometry(id, &geometry)
            .map_err(host_error)
    }

    fn do_render(&mut self, id: &str) {
        if !self.renders.iter().any(|queued| queued == id) {
            self.renders.push(id.to_string());
        }
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        self.host.set_drag_pan(enabled);
    }

    fn change_mode(&mut self, mode: &str, feature_ids: &[FeatureId]) {
        self.mode_change = Some((mode.to_string(), feature_ids.to_vec()));
    }
}
