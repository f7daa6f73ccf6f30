//! Rhumb bearings and rotation of geometries around a geographic pivot.
//!
//! Rotation keeps every vertex at its rhumb distance from the pivot and adds
//! the rotation angle to its rhumb bearing from the pivot:
//!
//! ```text
//! d  = rhumb_distance(pivot, p)
//! θ  = rhumb_bearing(pivot, p)
//! p' = rhumb_destination(pivot, θ + angle, d)
//! ```
//!
//! Because the angle is added in bearing space, successive rotations compose
//! additively: rotating by `a` then `b` is the same as rotating by `a + b`.

use geo::{Bearing, Coord, Destination, Distance, MapCoordsInPlace, Point, Rhumb};

/// Rhumb bearing from `from` to `to`, in degrees.
pub fn rhumb_bearing(from: Point<f64>, to: Point<f64>) -> f64 {
    Rhumb.bearing(from, to)
}

/// Wrap an angle delta into the range `(-180, 180]`.
///
/// Bearings jump from 360 back to 0 (or from 180 to -180), so a raw
/// difference of two bearings can be off by a full turn. Wrapping keeps the
/// applied rotation the short way round.
pub fn normalize_delta(angle_degrees: f64) -> f64 {
    let wrapped = angle_degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rotate a geometry in place around `pivot`.
///
/// # Arguments
///
/// * `geometry` - Geometry to rotate (mutated in place)
/// * `angle_degrees` - Rotation angle in degrees (positive = clockwise)
/// * `pivot` - Center of rotation
pub fn rotate_around<G>(geometry: &mut G, angle_degrees: f64, pivot: Point<f64>)
where
    G: MapCoordsInPlace<f64>,
{
    // Fast path: no rotation needed
    if angle_degrees == 0.0 {
        return;
    }

    geometry.map_coords_in_place(|coord: Coord<f64>| {
        let point = Point::from(coord);
        let distance = Rhumb.distance(pivot, point);
        if distance == 0.0 {
            return coord;
        }

        let bearing = Rhumb.bearing(pivot, point) + angle_degrees;
        Rhumb.destination(pivot, bearing, distance).into()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Polygon};

    const TOLERANCE: f64 = 1e-9;

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    fn assert_coords_close(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, tolerance: f64) {
        let a: Vec<_> = a.0.iter().flat_map(|p| p.exterior().coords().copied()).collect();
        let b: Vec<_> = b.0.iter().flat_map(|p| p.exterior().coords().copied()).collect();
        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.iter().zip(b.iter()) {
            assert!(
                (ca.x - cb.x).abs() < tolerance && (ca.y - cb.y).abs() < tolerance,
                "{:?} != {:?}",
                ca,
                cb
            );
        }
    }

    #[test]
    fn test_normalize_delta_in_range() {
        assert_eq!(normalize_delta(0.0), 0.0);
        assert_eq!(normalize_delta(90.0), 90.0);
        assert_eq!(normalize_delta(-90.0), -90.0);
        assert_eq!(normalize_delta(180.0), 180.0);
    }

    #[test]
    fn test_normalize_delta_wraps() {
        assert!((normalize_delta(358.0) - -2.0).abs() < TOLERANCE);
        assert!((normalize_delta(-358.0) - 2.0).abs() < TOLERANCE);
        assert!((normalize_delta(720.0 + 45.0) - 45.0).abs() < TOLERANCE);
        // -180 is the same turn as 180
        assert_eq!(normalize_delta(-180.0), 180.0);
    }

    #[test]
    fn test_bearing_north_and_east() {
        let origin = Point::new(0.0, 0.0);
        let north = rhumb_bearing(origin, Point::new(0.0, 1.0));
        let east = rhumb_bearing(origin, Point::new(1.0, 0.0));

        assert!(normalize_delta(north).abs() < 1e-6, "north was {}", north);
        assert!((normalize_delta(east) - 90.0).abs() < 1e-6, "east was {}", east);
    }

    #[test]
    fn test_zero_rotation_is_noop() {
        let mut geometry = MultiPolygon::new(vec![square()]);
        let original = geometry.clone();
        rotate_around(&mut geometry, 0.0, Point::new(0.5, 0.5));
        assert_eq!(geometry, original);
    }

    #[test]
    fn test_full_turn_restores_geometry() {
        let mut geometry = MultiPolygon::new(vec![square()]);
        let original = geometry.clone();
        rotate_around(&mut geometry, 360.0, Point::new(0.5, 0.5));
        assert_coords_close(&geometry, &original, TOLERANCE);
    }

    #[test]
    fn test_opposite_rotations_cancel() {
        let pivot = Point::new(0.5, 0.5);
        let mut geometry = MultiPolygon::new(vec![square()]);
        let original = geometry.clone();

        rotate_around(&mut geometry, 37.0, pivot);
        rotate_around(&mut geometry, -37.0, pivot);

        assert_coords_close(&geometry, &original, TOLERANCE);
    }

    #[test]
    fn test_rotations_compose() {
        let pivot = Point::new(0.5, 0.5);
        let mut stepped = MultiPolygon::new(vec![square()]);
        let mut direct = stepped.clone();

        rotate_around(&mut stepped, 20.0, pivot);
        rotate_around(&mut stepped, 50.0, pivot);
        rotate_around(&mut direct, 70.0, pivot);

        assert_coords_close(&stepped, &direct, TOLERANCE);
    }

    #[test]
    fn test_quarter_turn_is_clockwise() {
        // A vertex due north of the pivot ends up due east after +90
        let pivot = Point::new(0.0, 0.0);
        let mut point = Point::new(0.0, 1.0);
        rotate_around(&mut point, 90.0, pivot);

        assert!((point.x() - 1.0).abs() < 1e-3, "x was {}", point.x());
        assert!(point.y().abs() < 1e-3, "y was {}", point.y());
    }

    #[test]
    fn test_pivot_vertex_does_not_move() {
        let pivot = Point::new(0.0, 0.0);
        let mut geometry = MultiPolygon::new(vec![square()]);
        rotate_around(&mut geometry, 45.0, pivot);

        let first = geometry.0[0].exterior().0[0];
        assert_eq!(first, Coord { x: 0.0, y: 0.0 });
    }
}
