//! Merging polygon sets: preview payloads and the rotation pivot.

use geo::{Area, BooleanOps, Centroid, MultiPolygon, Point, Polygon};
use thiserror::Error;

/// Error types for geometry merge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// There are no polygons to merge.
    #[error("Cannot compute a center of mass for an empty set of polygons")]
    Empty,

    /// The union of the polygons has no area.
    #[error("Merged polygons have no area to compute a center of mass from")]
    ZeroArea,
}

/// Concatenate polygons into one multi-polygon without unioning them.
///
/// Order is preserved, so polygon `i` of the result is `polygons[i]`. The
/// rotation mode relies on this to map a rotated preview back onto the
/// features it was built from.
pub fn combine(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
    MultiPolygon::new(polygons.to_vec())
}

/// Area-weighted center of mass of the union of `polygons`.
///
/// Overlapping and adjacent polygons are unioned first so shared area is
/// not counted twice.
pub fn center_of_mass(polygons: &[Polygon<f64>]) -> Result<Point<f64>, GeometryError> {
    if polygons.is_empty() {
        return Err(GeometryError::Empty);
    }

    let merged = polygons
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
            acc.union(&MultiPolygon::new(vec![polygon.clone()]))
        });

    if merged.0.is_empty() || merged.unsigned_area() <= 0.0 {
        return Err(GeometryError::ZeroArea);
    }

    merged.centroid().ok_or(GeometryError::ZeroArea)
}
