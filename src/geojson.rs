//! GeoJSON input and output.
//!
//! Reads trail networks from a FeatureCollection and tracks from a LineString,
//! and writes classified segments back as a FeatureCollection that a map
//! renderer can color by the `visited` property.
//!
//! Structural problems (not a FeatureCollection, a feature without geometry,
//! an unsupported geometry type, malformed coordinates) are reported as
//! [`DiscoveryError::InvalidInput`] and stop the whole load.

use serde_json::{json, Map, Value};

use crate::error::{DiscoveryError, OptionExt, Result};
use crate::{DiscoveryResult, GpsPoint, Trail, TrailProperties};

/// Parse a FeatureCollection of LineString/MultiLineString features into trails.
///
/// A MultiLineString becomes one trail per part, with ids `"<id>#<part>"`.
///
/// # Example
/// ```
/// use trail_discovery::geojson::parse_trails;
///
/// let trails = parse_trails(r#"{
///     "type": "FeatureCollection",
///     "features": [{
///         "type": "Feature",
///         "properties": {"osm_id": 123, "name": "Skogsløypa"},
///         "geometry": {"type": "LineString", "coordinates": [[10.1, 61.2], [10.2, 61.3]]}
///     }]
/// }"#).unwrap();
///
/// assert_eq!(trails[0].id, "123");
/// assert_eq!(trails[0].name(), Some("Skogsløypa"));
/// assert_eq!(trails[0].geometry[0].latitude, 61.2);
/// ```
pub fn parse_trails(json: &str) -> Result<Vec<Trail>> {
    let value: Value = serde_json::from_str(json)?;
    trails_from_value(&value)
}

/// Same as [`parse_trails`] for an already-parsed document.
pub fn trails_from_value(value: &Value) -> Result<Vec<Trail>> {
    expect_type(value, "FeatureCollection")?;
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_invalid_input("FeatureCollection has no features array")?;

    let mut trails = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let id = feature_id(feature, index);
        let properties: TrailProperties = feature
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let geometry = feature
            .get("geometry")
            .filter(|g| !g.is_null())
            .ok_or_else(|| DiscoveryError::InvalidInput {
                message: format!("feature {} ('{}') has no geometry", index, id),
            })?;

        match geometry_type(geometry)? {
            "LineString" => {
                let points = parse_line(geometry_coordinates(geometry)?)?;
                trails.push(Trail::new(id, points, properties));
            }
            "MultiLineString" => {
                let parts = geometry_coordinates(geometry)?
                    .as_array()
                    .ok_or_invalid_input("MultiLineString coordinates must be an array")?;
                for (part, line) in parts.iter().enumerate() {
                    let points = parse_line(line)?;
                    trails.push(Trail::new(format!("{}#{}", id, part), points, properties.clone()));
                }
            }
            other => {
                return Err(DiscoveryError::InvalidInput {
                    message: format!(
                        "feature {} ('{}') has unsupported geometry type {}",
                        index, id, other
                    ),
                });
            }
        }
    }

    Ok(trails)
}

/// Parse a recorded track.
///
/// Accepts a LineString or MultiLineString geometry, a Feature wrapping one,
/// or a FeatureCollection whose Point and LineString features are concatenated
/// in order.
pub fn parse_track(json: &str) -> Result<Vec<GpsPoint>> {
    let value: Value = serde_json::from_str(json)?;
    track_from_value(&value)
}

/// Same as [`parse_track`] for an already-parsed document.
pub fn track_from_value(value: &Value) -> Result<Vec<GpsPoint>> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_invalid_input("FeatureCollection has no features array")?;
            let mut track = Vec::new();
            for feature in features {
                track.extend(track_from_value(feature)?);
            }
            Ok(track)
        }
        Some("Feature") => {
            let geometry = value
                .get("geometry")
                .filter(|g| !g.is_null())
                .ok_or_invalid_input("track feature has no geometry")?;
            track_from_value(geometry)
        }
        Some("Point") => Ok(vec![parse_position(geometry_coordinates(value)?)?]),
        Some("LineString") => parse_line(geometry_coordinates(value)?),
        Some("MultiLineString") => {
            let parts = geometry_coordinates(value)?
                .as_array()
                .ok_or_invalid_input("MultiLineString coordinates must be an array")?;
            let mut track = Vec::new();
            for line in parts {
                track.extend(parse_line(line)?);
            }
            Ok(track)
        }
        Some(other) => Err(DiscoveryError::InvalidInput {
            message: format!("unsupported track geometry type {}", other),
        }),
        None => Err(DiscoveryError::InvalidInput {
            message: "GeoJSON object has no type".to_string(),
        }),
    }
}

/// Build the renderer-facing FeatureCollection for a discovery result.
///
/// Each segment becomes a LineString feature carrying its trail's properties
/// plus `trail_id`, `segment_index`, `visited` and `length_meters`. The summary
/// statistics are attached as a top-level `stats` member.
pub fn result_to_feature_collection(result: &DiscoveryResult) -> Value {
    let features: Vec<Value> = result
        .segments
        .iter()
        .map(|segment| {
            let mut properties: Map<String, Value> = (*segment.properties).clone();
            properties.insert("trail_id".into(), json!(segment.key.trail_id));
            properties.insert("segment_index".into(), json!(segment.key.segment_index));
            properties.insert("visited".into(), json!(segment.visited));
            properties.insert("length_meters".into(), json!(segment.length_meters));

            let coordinates: Vec<[f64; 2]> =
                segment.polyline.iter().map(GpsPoint::to_lon_lat).collect();

            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": coordinates,
                },
                "properties": properties,
            })
        })
        .collect();

    let summary = result.stats.summary();
    json!({
        "type": "FeatureCollection",
        "features": features,
        "stats": {
            "total_km": summary.total_km,
            "visited_km": summary.visited_km,
            "discovery_percent": summary.discovery_percent,
            "total_segments": result.stats.total_segments,
            "visited_segments": result.stats.visited_segments,
        },
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn expect_type(value: &Value, expected: &str) -> Result<()> {
    match value.get("type").and_then(Value::as_str) {
        Some(t) if t == expected => Ok(()),
        Some(t) => Err(DiscoveryError::InvalidInput {
            message: format!("expected {}, found {}", expected, t),
        }),
        None => Err(DiscoveryError::InvalidInput {
            message: format!("expected {}, found an object without type", expected),
        }),
    }
}

fn geometry_type(geometry: &Value) -> Result<&str> {
    geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_invalid_input("geometry has no type")
}

fn geometry_coordinates(geometry: &Value) -> Result<&Value> {
    geometry
        .get("coordinates")
        .ok_or_invalid_input("geometry has no coordinates")
}

/// Feature id, then `osm_id` or `id` property, then the feature index.
fn feature_id(feature: &Value, index: usize) -> String {
    let properties = feature.get("properties");
    [
        feature.get("id"),
        properties.and_then(|p| p.get("osm_id")),
        properties.and_then(|p| p.get("id")),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
    .unwrap_or_else(|| index.to_string())
}

fn parse_line(coordinates: &Value) -> Result<Vec<GpsPoint>> {
    coordinates
        .as_array()
        .ok_or_invalid_input("LineString coordinates must be an array")?
        .iter()
        .map(parse_position)
        .collect()
}

/// `[lon, lat]` or `[lon, lat, elevation]`; elevation is ignored.
fn parse_position(position: &Value) -> Result<GpsPoint> {
    let values = position
        .as_array()
        .ok_or_invalid_input("position must be an array")?;
    match values.as_slice() {
        [lon, lat, ..] => {
            let lon = lon.as_f64().ok_or_invalid_input("longitude must be a number")?;
            let lat = lat.as_f64().ok_or_invalid_input("latitude must be a number")?;
            Ok(GpsPoint::from_lon_lat([lon, lat]))
        }
        _ => Err(DiscoveryError::InvalidInput {
            message: format!("position needs 2 numbers, got {}", position),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{discover_trails, DiscoveryConfig};

    const NETWORK: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "way/1",
                "properties": {"name": "Lysløypa"},
                "geometry": {"type": "LineString", "coordinates": [[10.0, 61.0], [10.0, 61.002, 540.0]]}
            },
            {
                "type": "Feature",
                "properties": {"id": 77},
                "geometry": {"type": "MultiLineString", "coordinates": [
                    [[10.01, 61.0], [10.01, 61.001]],
                    [[10.02, 61.0], [10.02, 61.001]]
                ]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": {"type": "LineString", "coordinates": [[10.03, 61.0], [10.03, 61.001]]}
            }
        ]
    }"#;

    #[test]
    fn test_parse_trails() {
        let trails = parse_trails(NETWORK).unwrap();
        let ids: Vec<&str> = trails.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["way/1", "77#0", "77#1", "2"]);
        assert_eq!(trails[0].name(), Some("Lysløypa"));
        assert_eq!(trails[0].geometry[1], GpsPoint::new(61.002, 10.0));
        assert!(trails[3].properties.is_empty());
    }

    #[test]
    fn test_missing_geometry_is_structural_error() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": null}
        ]}"#;
        let err = parse_trails(json).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput { .. }));
        assert!(err.to_string().contains("no geometry"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(matches!(
            parse_trails(r#"{"type": "Feature"}"#),
            Err(DiscoveryError::InvalidInput { .. })
        ));
        let polygon = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": []}}
        ]}"#;
        assert!(matches!(parse_trails(polygon), Err(DiscoveryError::InvalidInput { .. })));
        let bad_position = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[10.0], [10.0, 61.0]]}}
        ]}"#;
        assert!(matches!(parse_trails(bad_position), Err(DiscoveryError::InvalidInput { .. })));
        assert!(matches!(parse_trails("not json"), Err(DiscoveryError::Json { .. })));
    }

    #[test]
    fn test_parse_track_variants() {
        let line = r#"{"type": "LineString", "coordinates": [[10.0, 61.0], [10.0, 61.001]]}"#;
        assert_eq!(parse_track(line).unwrap().len(), 2);

        let collection = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10.0, 61.0]}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[10.0, 61.001], [10.0, 61.002]]}}
        ]}"#;
        let track = parse_track(collection).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track[0], GpsPoint::new(61.0, 10.0));
        assert_eq!(track[2], GpsPoint::new(61.002, 10.0));
    }

    #[test]
    fn test_result_round_trips_to_geojson() {
        let trails = parse_trails(NETWORK).unwrap();
        let track = trails[0].geometry.clone();
        let result = discover_trails(&trails, &track, &DiscoveryConfig::default()).unwrap();

        let collection = result_to_feature_collection(&result);
        let features = collection["features"].as_array().unwrap();
        assert_eq!(features.len(), result.segments.len());

        let first = &features[0];
        assert_eq!(first["geometry"]["type"], "LineString");
        assert_eq!(first["properties"]["name"], "Lysløypa");
        assert_eq!(first["properties"]["trail_id"], "way/1");
        assert_eq!(first["properties"]["visited"], true);

        let stats = &collection["stats"];
        assert_eq!(stats["total_segments"], result.stats.total_segments);
        assert!(stats["discovery_percent"].as_f64().unwrap() > 0.0);

        // Classified segments read back as trails with their extra properties
        let reread = trails_from_value(&collection).unwrap();
        assert_eq!(reread.len(), result.segments.len());
    }
}
