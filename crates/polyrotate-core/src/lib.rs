//! Polyrotate Core - interactive rotation of polygon map features
//!
//! This crate implements a draw mode that lets a user rotate one or more
//! selected polygons around their combined center of mass by dragging the
//! pointer. It is host-agnostic: the feature-editing toolkit that stores,
//! hit-tests and renders features is reached only through the
//! [`mode::DrawContext`] trait.
//!
//! # Module Structure
//!
//! - `geometry` - Rhumb bearings, rotation, polygon merging and GeoJSON conversion
//! - `mode` - The draw mode contract, a session runner and an in-memory host
//! - `rotate` - The rotation mode itself
//!
//! # Example
//!
//! ```ignore
//! use polyrotate_core::{Hook, InMemoryDraw, ModeRunner, PointerEvent, RotateMode, RotateOptions};
//!
//! let mut draw = InMemoryDraw::with_features(features);
//! let mut runner = ModeRunner::start(RotateMode, &mut draw, RotateOptions::new(["a", "b"]))?;
//!
//! runner.pointer(Hook::MouseDown, &mut draw, &mut PointerEvent::new(0.5, -0.5))?;
//! runner.pointer(Hook::Drag, &mut draw, &mut PointerEvent::new(-0.5, 0.5))?;
//! runner.pointer(Hook::MouseUp, &mut draw, &mut PointerEvent::new(-0.5, 0.5))?;
//! runner.stop(&mut draw);
//! ```

pub mod geometry;
pub mod mode;
pub mod rotate;

pub use geometry::GeometryError;
pub use mode::{
    DrawContext, DrawMode, FeatureId, Hook, InMemoryDraw, KeyEvent, ModeError, ModeRunner,
    PointerEvent,
};
pub use rotate::{
    CommitPolicy, RotateMode, RotateOptions, RotationState, EXIT_MODE, PREVIEW_FEATURE_ID,
};

/// Names of the hooks a mode implements, as the host sees them.
///
/// Names follow the host's declaration order of hooks, so `onSetup` leads
/// and `toDisplayFeatures` comes last.
pub fn hook_names<M: DrawMode>() -> Vec<&'static str> {
    Hook::ALL
        .into_iter()
        .filter(|hook| M::has_hook(*hook))
        .map(Hook::name)
        .collect()
}
