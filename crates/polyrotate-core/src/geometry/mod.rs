//! Geographic geometry helpers used by the rotation mode.
//!
//! These are thin wrappers over the `geo` crate's rhumb metric space, boolean
//! operations and centroid algorithms, plus the conversions between GeoJSON
//! feature payloads and typed `geo` polygons.
//!
//! # Conventions
//!
//! - Coordinates are `(longitude, latitude)` in degrees
//! - Angles are in degrees, positive = clockwise (compass bearing convention)
//! - Bearings and distances follow rhumb lines, not great circles

mod convert;
mod merge;
mod rotate;

pub use convert::{
    feature_id, feature_with_geometry, multi_polygon_value, polygon_from_feature, polygon_value,
    set_active,
};
pub use merge::{center_of_mass, combine, GeometryError};
pub use rotate::{normalize_delta, rhumb_bearing, rotate_around};
