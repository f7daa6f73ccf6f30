//! Conversions between GeoJSON feature payloads and `geo` polygons.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{feature::Id, Feature, Geometry, JsonObject, JsonValue, Value};

use crate::mode::{FeatureId, ModeError};

/// Identifier of a feature as the draw host reports it.
///
/// Render candidates carry their id in `properties.id`, stored features carry
/// it at the top level. The property wins when both are present.
pub fn feature_id(feature: &Feature) -> Option<FeatureId> {
    let from_properties = feature
        .properties
        .as_ref()
        .and_then(|properties| properties.get("id"))
        .and_then(|value| match value {
            JsonValue::String(id) => Some(id.clone()),
            JsonValue::Number(id) => Some(id.to_string()),
            _ => None,
        });

    from_properties.or_else(|| match &feature.id {
        Some(Id::String(id)) => Some(id.clone()),
        Some(Id::Number(id)) => Some(id.to_string()),
        None => None,
    })
}

/// Build a feature with a string id, mirroring the id into `properties.id`.
pub fn feature_with_geometry(id: &str, value: Value) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), JsonValue::from(id));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Set the draw host's `active` display flag on a feature.
pub fn set_active(feature: &mut Feature, active: bool) {
    let flag = if active { "true" } else { "false" };
    feature
        .properties
        .get_or_insert_with(JsonObject::new)
        .insert("active".to_string(), JsonValue::from(flag));
}

/// GeoJSON value for a multi-polygon.
pub fn multi_polygon_value(geometry: &MultiPolygon<f64>) -> Value {
    Value::from(geometry)
}

/// GeoJSON value for a single polygon.
pub fn polygon_value(polygon: &Polygon<f64>) -> Value {
    Value::from(polygon)
}

/// Validate a feature as a rotatable polygon and convert it.
///
/// The feature must be a `Polygon` with exactly one ring (no holes), the ring
/// must have more than 2 positions, and every position must be a finite
/// longitude/latitude pair.
pub fn polygon_from_feature(id: &str, feature: &Feature) -> Result<Polygon<f64>, ModeError> {
    let rings = match feature.geometry.as_ref().map(|geometry| &geometry.value) {
        Some(Value::Polygon(rings)) => rings,
        other => {
            return Err(ModeError::NotAPolygon {
                id: id.to_string(),
                kind: value_kind(other),
            })
        }
    };

    let ring = match rings.as_slice() {
        [] => {
            return Err(ModeError::DegenerateRing {
                id: id.to_string(),
                vertices: 0,
            })
        }
        [ring] => ring,
        _ => return Err(ModeError::PolygonWithHoles(id.to_string())),
    };

    if ring.len() <= 2 {
        return Err(ModeError::DegenerateRing {
            id: id.to_string(),
            vertices: ring.len(),
        });
    }

    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(ModeError::InvalidCoordinates(id.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(LineString::new(coords), Vec::new()))
}

fn value_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "feature without geometry",
        Some(Value::Point(_)) => "Point",
        Some(Value::MultiPoint(_)) => "MultiPoint",
        Some(Value::LineString(_)) => "LineString",
        Some(Value::MultiLineString(_)) => "MultiLineString",
        Some(Value::Polygon(_)) => "Polygon",
        Some(Value::MultiPolygon(_)) => "MultiPolygon",
        Some(Value::GeometryCollection(_)) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Vec<f64>> {
        points.iter().map(|&(x, y)| vec![x, y]).collect()
    }

    fn square_feature(id: &str) -> Feature {
        feature_with_geometry(
            id,
            Value::Polygon(vec![ring(&[
                (0.0, 0.0),
                (1.0, 0.0),
                (1.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.0),
            ])]),
        )
    }

    #[test]
    fn test_feature_id_from_top_level() {
        let mut feature = square_feature("a");
        feature.properties = None;
        assert_eq!(feature_id(&feature), Some("a".to_string()));
    }

    #[test]
    fn test_feature_id_prefers_properties() {
        let mut feature = square_feature("a");
        feature.id = Some(Id::String("draw-internal".to_string()));
        assert_eq!(feature_id(&feature), Some("a".to_string()));
    }

    #[test]
    fn test_feature_id_missing() {
        let mut feature = square_feature("a");
        feature.id = None;
        feature.properties = None;
        assert_eq!(feature_id(&feature), None);
    }

    #[test]
    fn test_set_active() {
        let mut feature = square_feature("a");
        set_active(&mut feature, true);
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties.get("active"), Some(&JsonValue::from("true")));

        set_active(&mut feature, false);
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties.get("active"), Some(&JsonValue::from("false")));
    }

    #[test]
    fn test_polygon_from_square() {
        let polygon = polygon_from_feature("a", &square_feature("a")).unwrap();
        assert_eq!(polygon.exterior().0.len(), 5);
        assert!(polygon.interiors().is_empty());
    }

    #[test]
    fn test_open_ring_is_closed() {
        let feature = feature_with_geometry(
            "a",
            Value::Polygon(vec![ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])]),
        );
        let polygon = polygon_from_feature("a", &feature).unwrap();
        assert!(polygon.exterior().is_closed());
    }

    #[test]
    fn test_rejects_line_string() {
        let feature = feature_with_geometry(
            "line",
            Value::LineString(ring(&[(0.0, 0.0), (1.0, 1.0)])),
        );
        let err = polygon_from_feature("line", &feature).unwrap_err();
        assert!(matches!(
            err,
            ModeError::NotAPolygon { kind: "LineString", .. }
        ));
    }

    #[test]
    fn test_rejects_missing_geometry() {
        let mut feature = square_feature("a");
        feature.geometry = None;
        assert!(matches!(
            polygon_from_feature("a", &feature),
            Err(ModeError::NotAPolygon { .. })
        ));
    }

    #[test]
    fn test_rejects_degenerate_ring() {
        let feature = feature_with_geometry(
            "thin",
            Value::Polygon(vec![ring(&[(0.0, 0.0), (1.0, 1.0)])]),
        );
        let err = polygon_from_feature("thin", &feature).unwrap_err();
        assert!(matches!(err, ModeError::DegenerateRing { vertices: 2, .. }));
    }

    #[test]
    fn test_rejects_empty_polygon() {
        let feature = feature_with_geometry("empty", Value::Polygon(vec![]));
        let err = polygon_from_feature("empty", &feature).unwrap_err();
        assert!(matches!(err, ModeError::DegenerateRing { vertices: 0, .. }));
    }

    #[test]
    fn test_rejects_holes() {
        let outer = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let hole = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let feature = feature_with_geometry("donut", Value::Polygon(vec![outer, hole]));
        assert!(matches!(
            polygon_from_feature("donut", &feature),
            Err(ModeError::PolygonWithHoles(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let feature = feature_with_geometry(
            "nan",
            Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![f64::NAN, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]]),
        );
        assert!(matches!(
            polygon_from_feature("nan", &feature),
            Err(ModeError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_multi_polygon_value() {
        let polygon = polygon_from_feature("a", &square_feature("a")).unwrap();
        let value = multi_polygon_value(&MultiPolygon::new(vec![polygon.clone(), polygon]));
        match value {
            Value::MultiPolygon(polygons) => assert_eq!(polygons.len(), 2),
            other => panic!("expected a multi-polygon, got {:?}", other),
        }
    }
}
