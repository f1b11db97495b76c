//! Tests for the GeoJSON boundary

use trail_discovery::geojson::*;
use trail_discovery::{discover_trails, DiscoveryConfig, DiscoveryError};

/// Trail network shaped like an OSM piste export
const PISTES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {
                "osm_id": 4711,
                "name": "Skeikampen rundt",
                "piste_type": "nordic",
                "piste_grooming": "classic+skating"
            },
            "geometry": {
                "type": "LineString",
                "coordinates": [[10.0000, 61.2000], [10.0000, 61.2030], [10.0040, 61.2050]]
            }
        },
        {
            "type": "Feature",
            "properties": {"osm_id": 4712, "name": "Kort sløyfe"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[10.0100, 61.2000], [10.0100, 61.2004]]
            }
        },
        {
            "type": "Feature",
            "properties": {"osm_id": 4713},
            "geometry": {"type": "LineString", "coordinates": [[10.02, 61.2]]}
        }
    ]
}"#;

#[test]
fn test_discovery_from_geojson() {
    let trails = parse_trails(PISTES).unwrap();
    assert_eq!(trails.len(), 3);
    assert_eq!(trails[0].id, "4711");

    let track = parse_track(
        r#"{"type": "Feature", "properties": {}, "geometry": {
            "type": "LineString",
            "coordinates": [[10.0001, 61.2000], [10.0001, 61.2010], [10.0001, 61.2020]]
        }}"#,
    )
    .unwrap();

    let result = discover_trails(&trails, &track, &DiscoveryConfig::default()).unwrap();

    // The single-point trail is skipped, not fatal
    assert_eq!(result.stats.degenerate_trails, 1);
    assert!(result.stats.visited_segments > 0);
    assert!(result.stats.visited_segments < result.stats.total_segments);

    let collection = result_to_feature_collection(&result);
    let features = collection["features"].as_array().unwrap();
    assert_eq!(features.len() as u32, result.stats.total_segments);

    let short_loop: Vec<_> = features
        .iter()
        .filter(|f| f["properties"]["trail_id"] == "4712")
        .collect();
    assert_eq!(short_loop.len(), 1);
    assert_eq!(short_loop[0]["properties"]["visited"], false);
    assert_eq!(short_loop[0]["properties"]["name"], "Kort sløyfe");
}

#[test]
fn test_structural_failure_halts_load() {
    let json = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"osm_id": 1}, "geometry": {"type": "LineString", "coordinates": [[10.0, 61.0], [10.0, 61.1]]}},
        {"type": "Feature", "properties": {"osm_id": 2}}
    ]}"#;
    let err = parse_trails(json).unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidInput { .. }));
    assert!(err.to_string().contains("'2'"));
}
