//! WASM bindings for the rotation draw mode.
//!
//! `RotateMode` owns at most one rotation session. The JavaScript side
//! registers a draw mode whose callbacks forward to the methods listed by
//! `RotateMode.hooks()`, passing a [`DrawHost`] adapter on every call.
//!
//! Methods take `&self` and borrow the session only for the duration of the
//! core hook, so a host calling back into `onStop` or `toDisplayFeatures`
//! from inside a flushed request finds the session free.

use std::cell::RefCell;

use js_sys::{Array, Function, Reflect};
use polyrotate_core::{hook_names, DrawMode, Hook, ModeError, ModeRunner, RotateMode, RotateOptions};
use wasm_bindgen::prelude::*;

use crate::host::{DrawHost, JsDrawContext};
use crate::types::{feature_from_js, feature_to_js, key_event, pointer_event, stop_propagation};

fn to_js_error(err: ModeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// JavaScript handle for the rotation mode.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rotate = new RotateMode();
/// const mode = {
///   onSetup(opts) { rotate.onSetup(host(this), opts); return {}; },
///   onMouseDown(_state, e) { rotate.onMouseDown(host(this), e); },
///   onDrag(_state, e) { rotate.onDrag(host(this), e); },
///   onMouseUp(_state, e) { rotate.onMouseUp(host(this), e); },
///   onKeyUp(_state, e) { rotate.onKeyUp(host(this), e); },
///   onStop() { rotate.onStop(host(this)); },
///   toDisplayFeatures(_state, geojson, display) {
///     rotate.toDisplayFeatures(geojson, display);
///   },
/// };
/// ```
#[wasm_bindgen(js_name = RotateMode)]
pub struct JsRotateMode {
    runner: RefCell<Option<ModeRunner<RotateMode>>>,
}

impl Default for JsRotateMode {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = RotateMode)]
impl JsRotateMode {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsRotateMode {
        JsRotateMode {
            runner: RefCell::new(None),
        }
    }

    /// Name the mode should be registered under.
    #[wasm_bindgen(js_name = modeName)]
    pub fn mode_name() -> String {
        RotateMode::NAME.to_string()
    }

    /// Callback names the host should wire up for this mode.
    pub fn hooks() -> Array {
        hook_names::<RotateMode>()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    #[wasm_bindgen(js_name = hasHook)]
    pub fn has_hook(name: &str) -> bool {
        Hook::from_name(name).is_some_and(RotateMode::has_hook)
    }

    /// Enter the mode. Throws if any feature cannot be rotated; the host
    /// then stays in its previous mode.
    ///
    /// # Arguments
    ///
    /// * `host` - Draw capabilities
    /// * `options` - `{ featureIds: string[], commit?: "onRelease" | "never" }`
    #[wasm_bindgen(js_name = onSetup)]
    pub fn on_setup(&self, host: &DrawHost, options: JsValue) -> Result<(), JsValue> {
        let options: RotateOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid rotate options: {}", e)))?;

        let mut ctx = JsDrawContext::new(host);
        // Re-entering without onStop ends the previous session first
        let previous = self.runner.borrow_mut().take();
        if let Some(previous) = previous {
            previous.stop(&mut ctx);
        }
        let result = ModeRunner::start(RotateMode, &mut ctx, options);
        ctx.flush();

        match result {
            Ok(runner) => {
                self.runner.replace(Some(runner));
                Ok(())
            }
            Err(err) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "polyrotate: cannot enter rotate mode: {}",
                    err
                )));
                Err(to_js_error(err))
            }
        }
    }

    #[wasm_bindgen(js_name = onMouseDown)]
    pub fn on_mouse_down(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::MouseDown, host, &event)
    }

    #[wasm_bindgen(js_name = onDrag)]
    pub fn on_drag(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::Drag, host, &event)
    }

    #[wasm_bindgen(js_name = onMouseUp)]
    pub fn on_mouse_up(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::MouseUp, host, &event)
    }

    #[wasm_bindgen(js_name = onTouchStart)]
    pub fn on_touch_start(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::TouchStart, host, &event)
    }

    #[wasm_bindgen(js_name = onTouchMove)]
    pub fn on_touch_move(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::TouchMove, host, &event)
    }

    #[wasm_bindgen(js_name = onTouchEnd)]
    pub fn on_touch_end(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        self.dispatch_pointer(Hook::TouchEnd, host, &event)
    }

    #[wasm_bindgen(js_name = onKeyUp)]
    pub fn on_key_up(&self, host: &DrawHost, event: JsValue) -> Result<(), JsValue> {
        let key = key_event(&event)?;
        let mut ctx = JsDrawContext::new(host);
        let result = match self.runner.borrow_mut().as_mut() {
            Some(runner) => runner.key(Hook::KeyUp, &mut ctx, &key),
            None => Ok(()),
        };
        ctx.flush();
        result.map_err(to_js_error)
    }

    /// Leave the mode, discarding the session. Safe to call more than once.
    #[wasm_bindgen(js_name = onStop)]
    pub fn on_stop(&self, host: &DrawHost) {
        let runner = self.runner.borrow_mut().take();
        if let Some(runner) = runner {
            let mut ctx = JsDrawContext::new(host);
            runner.stop(&mut ctx);
            ctx.flush();
        }
    }

    /// Render filtering for one candidate feature.
    ///
    /// Calls `display` with every feature to draw and writes the mode's
    /// `active` flag back onto the candidate's properties.
    #[wasm_bindgen(js_name = toDisplayFeatures)]
    pub fn to_display_features(&self, geojson: JsValue, display: &Function) -> Result<(), JsValue> {
        let runner = self.runner.borrow();
        let Some(runner) = runner.as_ref() else {
            display.call1(&JsValue::NULL, &geojson)?;
            return Ok(());
        };

        let mut feature = feature_from_js(geojson.clone())?;
        let mut emitted = Vec::new();
        runner.display(&mut feature, &mut |f| emitted.push(f));

        let active = feature
            .properties
            .as_ref()
            .and_then(|properties| properties.get("active"))
            .and_then(|value| value.as_str());
        if let Some(active) = active {
            let properties = Reflect::get(&geojson, &JsValue::from_str("properties"))?;
            if properties.is_object() {
                Reflect::set(&properties, &JsValue::from_str("active"), &JsValue::from_str(active))?;
            }
        }

        for feature in &emitted {
            display.call1(&JsValue::NULL, &feature_to_js(feature)?)?;
        }
        Ok(())
    }

    /// Whether a rotation session is active.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.runner.borrow().is_some()
    }

    /// Whether a drag is in progress.
    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.runner
            .borrow()
            .as_ref()
            .is_some_and(|runner| runner.state().is_dragging())
    }

    /// Rotation pivot as `[lng, lat]`, or `undefined` outside a session.
    pub fn pivot(&self) -> Option<Vec<f64>> {
        self.runner.borrow().as_ref().map(|runner| {
            let pivot = runner.state().pivot();
            vec![pivot.x(), pivot.y()]
        })
    }

    /// Rotation applied during this session, in degrees (positive = clockwise).
    #[wasm_bindgen(js_name = totalRotation)]
    pub fn total_rotation(&self) -> f64 {
        self.runner
            .borrow()
            .as_ref()
            .map_or(0.0, |runner| runner.state().total_rotation())
    }
}

impl JsRotateMode {
    fn dispatch_pointer(&self, hook: Hook, host: &DrawHost, event: &JsValue) -> Result<(), JsValue> {
        let mut pointer = pointer_event(event)?;
        let mut ctx = JsDrawContext::new(host);
        let result = match self.runner.borrow_mut().as_mut() {
            Some(runner) => runner.pointer(hook, &mut ctx, &mut pointer),
            None => Ok(()),
        };

        if pointer.is_propagation_stopped() {
            stop_propagation(event)?;
        }
        ctx.flush();
        result.map_err(to_js_error)
    }
}


/// WASM-specific tests that require a JavaScript host.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// A host holding two adjacent unit squares that records every call.
    fn test_host() -> (DrawHost, JsValue) {
        let factory = Function::new_no_args(
            r#"
            const square = (id, x) => ({
              type: 'Feature',
              id,
              properties: { id },
              geometry: {
                type: 'Polygon',
                coordinates: [[[x, 0], [x + 1, 0], [x + 1, 1], [x, 1], [x, 0]]],
              },
            });
            const log = { selected: [], renders: [], dragPan: true, modes: [], features: {} };
            log.features.a = square('a', 0);
            log.features.b = square('b', 1);
            const host = {
              getFeature: (id) => log.features[id],
              setSelected: (ids) => { log.selected = ids; },
              newFeature: (geojson) => geojson,
              addFeature: (feature) => { log.features[feature.id] = feature; },
              deleteFeature: (id) => { delete log.features[id]; },
              setFeatureGeometry: (id, geometry) => { log.features[id].geometry = geometry; },
              doRender: (id) => { log.renders.push(id); },
              setDragPan: (enabled) => { log.dragPan = enabled; },
              changeMode: (mode, opts) => { log.modes.push([mode, opts]); },
            };
            return [host, log];
            "#,
        );
        let pair: Array = factory.call0(&JsValue::NULL).unwrap().unchecked_into();
        (pair.get(0).unchecked_into(), pair.get(1))
    }

    fn field(object: &JsValue, name: &str) -> JsValue {
        Reflect::get(object, &JsValue::from_str(name)).unwrap()
    }

    fn options(ids: &[&str]) -> JsValue {
        let options = js_sys::Object::new();
        let ids: Array = ids.iter().map(|id| JsValue::from_str(id)).collect();
        Reflect::set(&options, &"featureIds".into(), &ids).unwrap();
        options.into()
    }

    fn map_event(lng: f64, lat: f64) -> JsValue {
        let lng_lat = js_sys::Object::new();
        Reflect::set(&lng_lat, &"lng".into(), &lng.into()).unwrap();
        Reflect::set(&lng_lat, &"lat".into(), &lat.into()).unwrap();
        let event = js_sys::Object::new();
        Reflect::set(&event, &"lngLat".into(), &lng_lat).unwrap();
        event.into()
    }

    #[wasm_bindgen_test]
    fn test_setup_selects_features() {
        let (host, log) = test_host();
        let mode = JsRotateMode::new();

        mode.on_setup(&host, options(&["a", "b"])).unwrap();

        assert!(mode.is_active());
        let selected: Array = field(&log, "selected").unchecked_into();
        assert_eq!(selected.length(), 2);
        let pivot = mode.pivot().unwrap();
        assert!((pivot[0] - 1.0).abs() < 1e-9);
        assert!((pivot[1] - 0.5).abs() < 1e-9);
    }

    #[wasm_bindgen_test]
    fn test_setup_rejects_unknown_feature() {
        let (host, log) = test_host();
        let mode = JsRotateMode::new();

        assert!(mode.on_setup(&host, options(&["a", "zz"])).is_err());
        assert!(!mode.is_active());
        let selected: Array = field(&log, "selected").unchecked_into();
        assert_eq!(selected.length(), 0);
    }

    #[wasm_bindgen_test]
    fn test_drag_session() {
        let (host, log) = test_host();
        let mode = JsRotateMode::new();
        mode.on_setup(&host, options(&["a", "b"])).unwrap();

        // South of the pivot, then west of it: a quarter turn
        mode.on_mouse_down(&host, map_event(1.0, 0.0)).unwrap();
        assert!(mode.is_dragging());
        assert_eq!(field(&log, "dragPan"), JsValue::FALSE);

        mode.on_drag(&host, map_event(0.0, 0.5)).unwrap();
        let renders: Array = field(&log, "renders").unchecked_into();
        assert_eq!(renders.get(0).as_string().as_deref(), Some("rotate-placeholder"));

        mode.on_mouse_up(&host, map_event(0.0, 0.5)).unwrap();
        assert!(!mode.is_dragging());
        assert_eq!(field(&log, "dragPan"), JsValue::TRUE);

        mode.on_stop(&host);
        assert!(!mode.is_active());
        let features = field(&log, "features");
        assert!(field(&features, "rotate-placeholder").is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_setup_again_ends_previous_session() {
        let (host, log) = test_host();
        let mode = JsRotateMode::new();
        mode.on_setup(&host, options(&["a", "b"])).unwrap();
        mode.on_mouse_down(&host, map_event(1.0, 0.0)).unwrap();
        assert_eq!(field(&log, "dragPan"), JsValue::FALSE);

        mode.on_setup(&host, options(&["a"])).unwrap();

        assert!(mode.is_active());
        assert!(!mode.is_dragging());
        assert_eq!(field(&log, "dragPan"), JsValue::TRUE);
        let features = field(&log, "features");
        assert!(field(&features, "rotate-placeholder").is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_display_hides_selection() {
        let (host, log) = test_host();
        let mode = JsRotateMode::new();
        mode.on_setup(&host, options(&["a"])).unwrap();

        let emitted = Array::new();
        let collect = Function::new_with_args("f", "this.push(f)").bind(&emitted);
        let features = field(&log, "features");

        mode.to_display_features(field(&features, "a"), &collect).unwrap();
        mode.to_display_features(field(&features, "b"), &collect).unwrap();

        assert_eq!(emitted.length(), 1);
        let a_properties = field(&field(&features, "a"), "properties");
        assert_eq!(field(&a_properties, "active").as_string().as_deref(), Some("true"));
    }
}
