//! Tests for error module

use trail_discovery::error::{DiscoveryError, OptionExt};

#[test]
fn test_error_display() {
    let err = DiscoveryError::Geometry {
        message: "end fraction 0.2 is before start fraction 0.7".to_string(),
    };
    assert!(err.to_string().starts_with("Geometry error"));

    let err = DiscoveryError::ConfigError {
        message: "segment_length_meters must be positive, got 0".to_string(),
    };
    assert!(err.to_string().contains("segment_length_meters"));
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "trails.geojson");
    let err: DiscoveryError = io.into();
    assert!(matches!(err, DiscoveryError::Io { .. }));
    assert!(err.to_string().contains("trails.geojson"));
}

#[test]
fn test_option_ext() {
    let some = Some(3);
    assert_eq!(some.ok_or_invalid_input("unused").unwrap(), 3);

    let none: Option<i32> = None;
    assert!(matches!(
        none.ok_or_invalid_input("missing"),
        Err(DiscoveryError::InvalidInput { .. })
    ));
}
