//! Tests for geo_utils module

use trail_discovery::geo_utils::*;
use trail_discovery::{DiscoveryError, GpsPoint};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn winding_trail() -> Vec<GpsPoint> {
    vec![
        GpsPoint::new(61.3000, 10.1000),
        GpsPoint::new(61.3012, 10.1021),
        GpsPoint::new(61.3030, 10.1025),
        GpsPoint::new(61.3031, 10.1060),
        GpsPoint::new(61.3055, 10.1071),
        GpsPoint::new(61.3080, 10.1050),
    ]
}

#[test]
fn test_haversine_known_value() {
    // London to Paris is approximately 344 km
    let london = GpsPoint::new(51.5074, -0.1278);
    let paris = GpsPoint::new(48.8566, 2.3522);
    assert!(approx_eq(haversine_distance(&london, &paris), 343_560.0, 5000.0));
}

#[test]
fn test_haversine_is_symmetric() {
    let trail = winding_trail();
    for pair in trail.windows(2) {
        assert_eq!(
            haversine_distance(&pair[0], &pair[1]),
            haversine_distance(&pair[1], &pair[0])
        );
    }
}

#[test]
fn test_length_is_non_negative() {
    let trail = winding_trail();
    for n in 0..=trail.len() {
        assert!(polyline_length(&trail[..n]) >= 0.0);
    }
    assert_eq!(polyline_length(&trail[..1]), 0.0);
}

#[test]
fn test_reversed_polyline_has_same_length() {
    let trail = winding_trail();
    let mut reversed = trail.clone();
    reversed.reverse();
    assert!(approx_eq(polyline_length(&trail), polyline_length(&reversed), 1e-6));
}

#[test]
fn test_subpath_lengths_are_proportional() {
    let trail = winding_trail();
    let total = polyline_length(&trail);
    for (start, end) in [(0.0, 0.1), (0.25, 0.6), (0.33, 0.34), (0.9, 1.0)] {
        let slice = subpath(&trail, start, end).unwrap();
        let expected = (end - start) * total;
        assert!(
            approx_eq(polyline_length(&slice), expected, expected * 1e-4 + 1e-6),
            "slice {}..{}",
            start,
            end
        );
    }
}

#[test]
fn test_subpath_keeps_interior_vertices() {
    let trail = winding_trail();
    let cumulative = cumulative_distances(&trail);
    let total = cumulative[cumulative.len() - 1];

    // A slice spanning vertex 3 must contain it unchanged
    let start = (cumulative[3] - 20.0) / total;
    let end = (cumulative[3] + 20.0) / total;
    let slice = subpath(&trail, start, end).unwrap();
    assert_eq!(slice.len(), 3);
    assert_eq!(slice[1], trail[3]);
}

#[test]
fn test_subpath_errors() {
    let trail = winding_trail();
    assert!(matches!(subpath(&trail, 0.7, 0.2), Err(DiscoveryError::Geometry { .. })));
    assert!(matches!(subpath(&trail, 0.0, 1.01), Err(DiscoveryError::Geometry { .. })));
    assert!(matches!(subpath(&trail[..1], 0.0, 1.0), Err(DiscoveryError::Geometry { .. })));
}

#[test]
fn test_flat_conversion() {
    assert!(approx_eq(flat_meters_to_degrees(50.0) * FLAT_METERS_PER_DEGREE, 50.0, 1e-9));
}
