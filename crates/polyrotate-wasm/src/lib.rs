//! Polyrotate WASM - WebAssembly bindings for Polyrotate
//!
//! This crate exposes the polyrotate-core rotation mode to a JavaScript
//! feature-editing host such as mapbox-gl-draw.
//!
//! # Module Structure
//!
//! - `mode` - The `RotateMode` class the host's custom mode forwards to
//! - `host` - The `DrawHost` capability interface and its `DrawContext` bridge
//! - `types` - Conversion of map events, keyboard events and GeoJSON
//!
//! # Usage
//!
//! ```typescript
//! import init, { RotateMode } from '@polyrotate/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const rotate = new RotateMode();
//! console.log(`Wiring ${RotateMode.hooks().join(', ')}`);
//! draw.changeMode(RotateMode.modeName(), { featureIds: draw.getSelectedIds() });
//! ```

use wasm_bindgen::prelude::*;

mod host;
mod mode;
mod types;

// Re-export public types
pub use host::DrawHost;
pub use mode::JsRotateMode;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "polyrotate {} loaded",
        version()
    )));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
