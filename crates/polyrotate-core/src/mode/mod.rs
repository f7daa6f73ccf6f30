//! The draw mode contract: lifecycle hooks and host capabilities.
//!
//! A draw mode takes exclusive control of pointer and keyboard input and of
//! render decisions while it is active. The host (the feature-editing
//! toolkit that owns feature storage, hit-testing and rendering) drives the
//! mode through a fixed set of lifecycle hooks and hands it a
//! [`DrawContext`] exposing the capabilities it may use.
//!
//! # Hooks
//!
//! Every mode implements two required hooks, `onSetup` and
//! `toDisplayFeatures`. All other hooks are optional: a mode declares the ones
//! it implements in [`DrawMode::HOOKS`], and hosts ask
//! [`DrawMode::has_hook`] before wiring up an event. Undeclared hooks are
//! never dispatched.
//!
//! # Threading
//!
//! Hooks run synchronously on the thread that dispatches input and render
//! events. A session is owned by exactly one [`ModeRunner`]; there is no
//! shared state and no locking.

mod memory;
mod runner;
mod types;

pub use memory::InMemoryDraw;
pub use runner::ModeRunner;
pub use types::{FeatureId, KeyEvent, ModeError, PointerEvent};

use geojson::{Feature, Geometry};

/// Lifecycle hooks a draw host can invoke on a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Setup,
    MouseDown,
    MouseMove,
    Drag,
    MouseUp,
    MouseOut,
    Click,
    KeyUp,
    KeyDown,
    TouchStart,
    TouchMove,
    TouchEnd,
    Tap,
    Stop,
    Trash,
    CombineFeatures,
    UncombineFeatures,
    DisplayFeatures,
}

impl Hook {
    /// Every hook, in host declaration order.
    pub const ALL: [Hook; 18] = [
        Hook::Setup,
        Hook::MouseDown,
        Hook::MouseMove,
        Hook::Drag,
        Hook::MouseUp,
        Hook::MouseOut,
        Hook::Click,
        Hook::KeyUp,
        Hook::KeyDown,
        Hook::TouchStart,
        Hook::TouchMove,
        Hook::TouchEnd,
        Hook::Tap,
        Hook::Stop,
        Hook::Trash,
        Hook::CombineFeatures,
        Hook::UncombineFeatures,
        Hook::DisplayFeatures,
    ];

    /// Name of the callback on the JavaScript mode object.
    pub fn name(self) -> &'static str {
        match self {
            Hook::Setup => "onSetup",
            Hook::MouseDown => "onMouseDown",
            Hook::MouseMove => "onMouseMove",
            Hook::Drag => "onDrag",
            Hook::MouseUp => "onMouseUp",
            Hook::MouseOut => "onMouseOut",
            Hook::Click => "onClick",
            Hook::KeyUp => "onKeyUp",
            Hook::KeyDown => "onKeyDown",
            Hook::TouchStart => "onTouchStart",
            Hook::TouchMove => "onTouchMove",
            Hook::TouchEnd => "onTouchEnd",
            Hook::Tap => "onTap",
            Hook::Stop => "onStop",
            Hook::Trash => "onTrash",
            Hook::CombineFeatures => "onCombineFeature",
            Hook::UncombineFeatures => "onUncombineFeature",
            Hook::DisplayFeatures => "toDisplayFeatures",
        }
    }

    /// Look a hook up by its callback name.
    pub fn from_name(name: &str) -> Option<Hook> {
        Self::ALL.into_iter().find(|hook| hook.name() == name)
    }

    /// Whether every mode must implement this hook.
    pub fn is_required(self) -> bool {
        matches!(self, Hook::Setup | Hook::DisplayFeatures)
    }

    /// Whether this hook receives a pointer event.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            Hook::MouseDown
                | Hook::MouseMove
                | Hook::Drag
                | Hook::MouseUp
                | Hook::MouseOut
                | Hook::Click
                | Hook::TouchStart
                | Hook::TouchMove
                | Hook::TouchEnd
                | Hook::Tap
        )
    }
}

/// Capabilities the draw host exposes to the active mode.
///
/// Hosts may defer `do_render` and `change_mode` until the current hook has
/// returned, so a mode must not expect either to take effect synchronously.
pub trait DrawContext {
    /// Look up a stored feature by id.
    fn get_feature(&self, id: &str) -> Option<Feature>;

    /// Replace the host's selection with `ids`.
    fn set_selected(&mut self, ids: &[FeatureId]);

    /// Turn a GeoJSON payload into a host feature, returning it as stored.
    fn new_feature(&mut self, feature: Feature) -> Result<Feature, ModeError>;

    /// Register a feature created by [`DrawContext::new_feature`] with the render set.
    fn add_feature(&mut self, feature: Feature) -> Result<(), ModeError>;

    /// Remove a feature from the host. Unknown ids are ignored.
    fn delete_feature(&mut self, id: &str);

    /// Overwrite the geometry of a stored feature.
    fn set_feature_geometry(&mut self, id: &str, geometry: Geometry) -> Result<(), ModeError>;

    /// Ask the host to re-render one feature.
    fn do_render(&mut self, id: &str);

    /// Enable or disable the map's default drag-to-pan behavior.
    fn set_drag_pan(&mut self, enabled: bool);

    /// Request a transition to another mode.
    fn change_mode(&mut self, mode: &str, feature_ids: &[FeatureId]);
}

/// An interactive editing mode.
///
/// `Options` is what the host passes on entry, `State` is the per-session
/// state created by [`DrawMode::on_setup`] and threaded through every hook.
pub trait DrawMode {
    type Options;
    type State;

    /// Name the host registers the mode under.
    const NAME: &'static str;

    /// Optional hooks this mode implements.
    const HOOKS: &'static [Hook];

    fn has_hook(hook: Hook) -> bool {
        hook.is_required() || Self::HOOKS.contains(&hook)
    }

    /// Create the session state, or fail and leave the host in its previous mode.
    fn on_setup(
        &self,
        ctx: &mut dyn DrawContext,
        options: Self::Options,
    ) -> Result<Self::State, ModeError>;

    /// Decide how one candidate feature is drawn this render pass.
    ///
    /// Call `display` for every feature that should be drawn. The candidate's
    /// display properties may be rewritten; candidates never passed to
    /// `display` are not drawn this frame.
    fn to_display_features(
        &self,
        state: &Self::State,
        feature: &mut Feature,
        display: &mut dyn FnMut(Feature),
    );

    fn on_mouse_down(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_mouse_move(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_drag(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_mouse_up(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_mouse_out(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_click(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_touch_start(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_touch_move(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_touch_end(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_tap(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_key_up(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &KeyEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_key_down(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
        _event: &KeyEvent,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_trash(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_combine_features(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    fn on_uncombine_features(
        &self,
        _state: &mut Self::State,
        _ctx: &mut dyn DrawContext,
    ) -> Result<(), ModeError> {
        Ok(())
    }

    /// The mode is being exited; clean up transient artifacts.
    fn on_stop(&self, _state: &mut Self::State, _ctx: &mut dyn DrawContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hook_names_are_unique() {
        let names: HashSet<_> = Hook::ALL.iter().map(|hook| hook.name()).collect();
        assert_eq!(names.len(), Hook::ALL.len());
    }

    #[test]
    fn test_hook_name_lookup() {
        for hook in Hook::ALL {
            assert_eq!(Hook::from_name(hook.name()), Some(hook));
        }
        assert_eq!(Hook::from_name("onDrag"), Some(Hook::Drag));
        assert_eq!(Hook::from_name("onDragging"), None);
    }

    #[test]
    fn test_required_hooks() {
        let required: Vec<_> = Hook::ALL.into_iter().filter(|h| h.is_required()).collect();
        assert_eq!(required, vec![Hook::Setup, Hook::DisplayFeatures]);
    }

    #[test]
    fn test_pointer_hooks() {
        assert!(Hook::Drag.is_pointer());
        assert!(Hook::TouchStart.is_pointer());
        assert!(!Hook::KeyUp.is_pointer());
        assert!(!Hook::Stop.is_pointer());
        assert!(!Hook::DisplayFeatures.is_pointer());
    }
}
