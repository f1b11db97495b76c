//! # Geographic Utilities
//!
//! Core geographic computation for trail discovery.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a polyline in meters |
//! | [`cumulative_distances`] | Running arc length at every vertex |
//! | [`subpath`] | Proportional slice of a polyline by arc-length fraction |
//! | [`subpath_along`] | Same, reusing precomputed cumulative distances |
//! | [`flat_meters_to_degrees`] | Constant 111 km/degree conversion used for buffers |
//! | [`meters_to_degrees`] | Latitude and longitude tolerance for a [`BufferModel`] |
//! | [`compute_bounds`] | Bounding box of a polyline |
//! | [`compute_center`] | Mean position, used to center a map on a track |
//!
//! ## Example
//!
//! ```rust
//! use trail_discovery::{GpsPoint, geo_utils};
//!
//! let trail = vec![
//!     GpsPoint::new(61.2000, 10.1000),
//!     GpsPoint::new(61.2010, 10.1000),
//!     GpsPoint::new(61.2020, 10.1010),
//! ];
//!
//! let length = geo_utils::polyline_length(&trail);
//! let first_half = geo_utils::subpath(&trail, 0.0, 0.5).unwrap();
//! let half_length = geo_utils::polyline_length(&first_half);
//! assert!((half_length - length / 2.0).abs() < 0.5);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a sphere of radius 6,371,000 m.
//! The central-angle term is clamped to `[0, 1]` so rounding near zero-length
//! or antipodal pairs never leaves the domain of `sqrt`/`atan2`.
//!
//! Sub-paths are measured along cumulative haversine arc length, not vertex
//! count. Points between vertices are interpolated linearly in lon/lat, which
//! is indistinguishable from the great circle at trail scale.

use crate::error::{DiscoveryError, Result};
use crate::{BufferModel, Bounds, GpsPoint};

/// Mean Earth radius used by the haversine formula (meters).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Flat conversion factor: one degree is taken as 111 km on both axes.
pub const FLAT_METERS_PER_DEGREE: f64 = 111_000.0;

/// Floor for the longitude scale so buffers stay bounded near the poles.
pub const MIN_LONGITUDE_SCALE: f64 = 0.1;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// # Example
///
/// ```rust
/// use trail_discovery::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let phi1 = p1.latitude.to_radians();
    let phi2 = p2.latitude.to_radians();
    let delta_phi = (p2.latitude - p1.latitude).to_radians();
    let delta_lambda = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Calculate the total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// polylines return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Running arc length at each vertex. The first entry is 0 and the last is the
/// polyline length. Empty input gives an empty vector.
pub fn cumulative_distances(points: &[GpsPoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(&points[i - 1], point);
        }
        cumulative.push(total);
    }
    cumulative
}

// =============================================================================
// Proportional Sub-paths
// =============================================================================

/// Extract the part of a polyline between two fractions of its arc length.
///
/// The slice starts and ends at interpolated points and keeps every original
/// vertex strictly in between. Fractions must satisfy
/// `0 <= start_fraction <= end_fraction <= 1`; anything else (including NaN)
/// is a [`DiscoveryError::Geometry`].
///
/// A zero-length polyline returns a two-point slice at its first vertex, and
/// equal fractions return a two-point slice of zero length, so the output is
/// always a valid polyline.
///
/// # Example
///
/// ```rust
/// use trail_discovery::{GpsPoint, geo_utils};
///
/// let line = vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.0, 1.0)];
/// let middle = geo_utils::subpath(&line, 0.25, 0.75).unwrap();
/// assert_eq!(middle.len(), 2);
/// assert!((middle[0].longitude - 0.25).abs() < 1e-9);
///
/// assert!(geo_utils::subpath(&line, 0.8, 0.2).is_err());
/// ```
pub fn subpath(points: &[GpsPoint], start_fraction: f64, end_fraction: f64) -> Result<Vec<GpsPoint>> {
    subpath_along(points, &cumulative_distances(points), start_fraction, end_fraction)
}

/// [`subpath`] with the cumulative distances of `points` already computed.
///
/// Slicing the same polyline many times costs `O(log n)` per slice plus the
/// vertices copied. A total length that is not finite (NaN coordinates) is a
/// [`DiscoveryError::Geometry`].
pub fn subpath_along(
    points: &[GpsPoint],
    cumulative: &[f64],
    start_fraction: f64,
    end_fraction: f64,
) -> Result<Vec<GpsPoint>> {
    let in_range = |f: f64| (0.0..=1.0).contains(&f);
    if !in_range(start_fraction) || !in_range(end_fraction) {
        return Err(DiscoveryError::Geometry {
            message: format!(
                "fractions must lie in [0, 1], got {} to {}",
                start_fraction, end_fraction
            ),
        });
    }
    if end_fraction < start_fraction {
        return Err(DiscoveryError::Geometry {
            message: format!(
                "end fraction {} is before start fraction {}",
                end_fraction, start_fraction
            ),
        });
    }
    if points.len() < 2 || cumulative.len() != points.len() {
        return Err(DiscoveryError::Geometry {
            message: format!(
                "cannot slice a polyline of {} points with {} distances",
                points.len(),
                cumulative.len()
            ),
        });
    }

    let total = cumulative[cumulative.len() - 1];
    if !total.is_finite() {
        return Err(DiscoveryError::Geometry {
            message: format!("polyline length is not finite ({})", total),
        });
    }
    if total <= 0.0 {
        return Ok(vec![points[0], points[0]]);
    }

    let start_dist = start_fraction * total;
    let end_dist = end_fraction * total;

    // Interior vertices: start_dist < d < end_dist
    let first = cumulative.partition_point(|&d| d <= start_dist);
    let last = cumulative.partition_point(|&d| d < end_dist).max(first);

    let mut slice = Vec::with_capacity(last - first + 2);
    slice.push(interpolate_at(points, cumulative, start_dist));
    slice.extend_from_slice(&points[first..last]);
    slice.push(interpolate_at(points, cumulative, end_dist));

    Ok(slice)
}

/// Point at `distance` meters along the polyline, given its cumulative distances.
fn interpolate_at(points: &[GpsPoint], cumulative: &[f64], distance: f64) -> GpsPoint {
    let idx = cumulative.partition_point(|&d| d < distance);
    if idx == 0 {
        return points[0];
    }
    if idx >= points.len() {
        return points[points.len() - 1];
    }

    let seg_start = cumulative[idx - 1];
    let seg_len = cumulative[idx] - seg_start;
    let t = if seg_len > 0.0 {
        (distance - seg_start) / seg_len
    } else {
        0.0
    };

    let p1 = &points[idx - 1];
    let p2 = &points[idx];
    if t <= 0.0 {
        return *p1;
    }
    if t >= 1.0 {
        return *p2;
    }
    GpsPoint::new(
        p1.latitude + t * (p2.latitude - p1.latitude),
        p1.longitude + t * (p2.longitude - p1.longitude),
    )
}

// =============================================================================
// Unit Conversion
// =============================================================================

/// Convert meters to degrees with the flat `1 degree = 111 km` approximation.
///
/// The result is used on both axes regardless of latitude, which overstates
/// east-west width away from the equator.
#[inline]
pub fn flat_meters_to_degrees(meters: f64) -> f64 {
    meters / FLAT_METERS_PER_DEGREE
}

/// Factor applied to longitude differences before planar distances are taken.
///
/// 1 for [`BufferModel::FlatDegrees`], `cos(latitude)` floored at
/// [`MIN_LONGITUDE_SCALE`] for [`BufferModel::LatitudeCorrected`].
pub fn longitude_scale(model: BufferModel, latitude: f64) -> f64 {
    match model {
        BufferModel::FlatDegrees => 1.0,
        BufferModel::LatitudeCorrected => latitude.to_radians().cos().max(MIN_LONGITUDE_SCALE),
    }
}

/// Convert a distance in meters to `(latitude, longitude)` degree tolerances.
///
/// The latitude tolerance is always the flat conversion. The longitude
/// tolerance widens with latitude under [`BufferModel::LatitudeCorrected`].
///
/// # Example
///
/// ```rust
/// use trail_discovery::{geo_utils, BufferModel};
///
/// let (lat, lng) = geo_utils::meters_to_degrees(111.0, BufferModel::FlatDegrees, 61.0);
/// assert_eq!(lat, lng);
///
/// let (lat, lng) = geo_utils::meters_to_degrees(111.0, BufferModel::LatitudeCorrected, 60.0);
/// assert!((lng - 2.0 * lat).abs() < 1e-12);
/// ```
pub fn meters_to_degrees(meters: f64, model: BufferModel, latitude: f64) -> (f64, f64) {
    let lat_degrees = flat_meters_to_degrees(meters);
    (lat_degrees, lat_degrees / longitude_scale(model, latitude))
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a polyline.
///
/// For empty input returns a bounds with MIN/MAX values that contain nothing.
pub fn compute_bounds(points: &[GpsPoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

/// Compute the center point (mean) of a polyline.
///
/// Returns `(0, 0)` for empty input.
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GpsPoint::new(sum_lat / n, sum_lng / n)
}

// =============================================================================
// Unit Tests
// =============================================================================
