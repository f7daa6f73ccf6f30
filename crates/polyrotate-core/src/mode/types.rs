//! Core types shared by draw modes and their hosts.

use geo::Point;
use thiserror::Error;

use crate::geometry::GeometryError;

/// Identifier of a feature held by the draw host.
pub type FeatureId = String;

/// Error types for mode setup and lifecycle hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// The mode was entered without any features to act on.
    #[error("No feature ids were given to rotate")]
    EmptySelection,

    /// The host has no feature with this id.
    #[error("You must provide a valid feature id, {0} does not exist")]
    FeatureNotFound(FeatureId),

    /// The feature is not a polygon.
    #[error("Feature {id} is a {kind}, only polygons can be rotated")]
    NotAPolygon { id: FeatureId, kind: &'static str },

    /// The polygon's ring has too few vertices to enclose an area.
    #[error("Feature {id} has a ring with {vertices} vertices, at least 3 are required")]
    DegenerateRing { id: FeatureId, vertices: usize },

    /// The polygon has interior rings.
    #[error("Feature {0} has holes, only single-ring polygons can be rotated")]
    PolygonWithHoles(FeatureId),

    /// A position is missing an axis or is not a finite number.
    #[error("Feature {0} has invalid coordinates")]
    InvalidCoordinates(FeatureId),

    /// Merging the selected geometries failed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// The draw host refused a request.
    #[error("Draw host error: {0}")]
    Host(String),
}

/// A pointer (mouse or single touch) event in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    position: Point<f64>,
    propagation_stopped: bool,
}

impl PointerEvent {
    /// Create an event at the given longitude/latitude.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self::at(Point::new(lng, lat))
    }

    /// Create an event at the given point.
    pub fn at(position: Point<f64>) -> Self {
        Self {
            position,
            propagation_stopped: false,
        }
    }

    /// Pointer position as `(longitude, latitude)`.
    pub fn position(&self) -> Point<f64> {
        self.position
    }

    /// Keep the event from reaching the map's own pan/zoom handlers.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// A keyboard event, identified by its `KeyboardEvent.key` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.key == "Esc"
    }

    pub fn is_enter(&self) -> bool {
        self.key == "Enter"
    }
}
