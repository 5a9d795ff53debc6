//! `GeoJSON` `FeatureCollection` parsing into [`AreaFeature`]s.
//!
//! Features with unusable geometry or missing attributes are skipped with
//! a logged reason rather than failing the whole layer; population layers
//! in the wild routinely carry a handful of broken rows.

use geo::MultiPolygon;
use geojson::GeoJson;

use crate::{AreaFeature, LayerFields, SourceError};

/// Parses a `GeoJSON` `FeatureCollection` into areal features.
///
/// # Errors
///
/// Returns [`SourceError::Conversion`] if the document is not valid
/// `GeoJSON` or is not a `FeatureCollection`. Individual unusable features
/// are skipped with a warning, not an error.
pub fn parse_feature_collection(
    raw: &str,
    fields: &LayerFields,
) -> Result<Vec<AreaFeature>, SourceError> {
    let geojson: GeoJson = raw.parse().map_err(|e| SourceError::Conversion {
        message: format!("Failed to parse GeoJSON: {e}"),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(SourceError::Conversion {
            message: "Expected a GeoJSON FeatureCollection".to_string(),
        });
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let id = fields
            .id
            .as_deref()
            .and_then(|name| property_string(&feature, name))
            .unwrap_or_else(|| format!("feature-{index}"));

        let Some(geometry) = feature.geometry.as_ref().and_then(to_multipolygon) else {
            log::warn!("Skipping feature '{id}': no polygonal geometry");
            continue;
        };

        let Some(population) = numeric_property(&feature, &fields.population) else {
            log::warn!(
                "Skipping feature '{id}': missing numeric '{}' property",
                fields.population
            );
            continue;
        };
        if population < 0.0 {
            log::warn!("Skipping feature '{id}': negative population {population}");
            continue;
        }

        let Some(reference_area) = numeric_property(&feature, &fields.area) else {
            log::warn!(
                "Skipping feature '{id}': missing numeric '{}' property",
                fields.area
            );
            continue;
        };

        features.push(AreaFeature {
            id,
            geometry,
            population,
            reference_area,
        });
    }

    Ok(features)
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Reads a numeric property, accepting either a JSON number or a numeric
/// string (open data portals serve both).
fn numeric_property(feature: &geojson::Feature, name: &str) -> Option<f64> {
    match feature.property(name)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a property as a string, stringifying numbers (ids are often
/// numeric in source data).
fn property_string(feature: &geojson::Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> LayerFields {
        LayerFields {
            id: Some("GEOID".to_string()),
            population: "POP".to_string(),
            area: "AREA_SQMI".to_string(),
        }
    }

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"GEOID": "11001", "POP": 4200, "AREA_SQMI": 1.5},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"GEOID": "11002", "POP": "1300", "AREA_SQMI": "0.75"},
                "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,1],[2,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"GEOID": "11003", "AREA_SQMI": 2.0},
                "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1],[4,1],[4,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"GEOID": "11004", "POP": 10, "AREA_SQMI": 1.0},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            }
        ]
    }"#;

    #[test]
    fn parses_usable_features_and_skips_broken_ones() {
        let features = parse_feature_collection(LAYER, &fields()).unwrap();
        // 11003 lacks POP, 11004 is not polygonal.
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id, "11001");
        assert!((features[0].population - 4_200.0).abs() < f64::EPSILON);
        assert!((features[0].reference_area - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_numeric_strings() {
        let features = parse_feature_collection(LAYER, &fields()).unwrap();
        assert!((features[1].population - 1_300.0).abs() < f64::EPSILON);
        assert!((features[1].reference_area - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn falls_back_to_load_order_ids() {
        let no_id = LayerFields {
            id: None,
            ..fields()
        };
        let features = parse_feature_collection(LAYER, &no_id).unwrap();
        assert_eq!(features[0].id, "feature-0");
    }

    #[test]
    fn rejects_non_collection_documents() {
        let geometry_only = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(parse_feature_collection(geometry_only, &fields()).is_err());
        assert!(parse_feature_collection("not json", &fields()).is_err());
    }
}
