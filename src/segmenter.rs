//! Proportional trail segmentation.
//!
//! A trail is cut into `max(1, floor(length / target))` slices of equal arc
//! length. Slices that cannot be extracted are dropped and reported, never
//! fatal for the rest of the trail.

use log::debug;

use crate::error::{DiscoveryError, Result};
use crate::geo_utils::{cumulative_distances, subpath_along};
use crate::GpsPoint;

/// A slice that could not be extracted from its trail.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedSlice {
    /// Position of the slice within the trail
    pub segment_index: u32,
    /// Why extraction failed
    pub error: DiscoveryError,
}

/// Output of [`segment_polyline`].
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Extracted slices in geometric order, each paired with its slice index
    pub slices: Vec<(u32, Vec<GpsPoint>)>,
    /// Slices that failed extraction
    pub dropped: Vec<DroppedSlice>,
    /// Length of the source polyline in meters
    pub total_length: f64,
}

/// Number of slices a polyline of `total_length` meters is cut into.
///
/// Always at least 1, even when the polyline is shorter than the target.
pub fn segment_count(total_length: f64, target_length_meters: f64) -> u32 {
    let count = (total_length / target_length_meters).floor();
    if count.is_finite() && count >= 1.0 {
        count.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Divide a polyline into contiguous slices of roughly `target_length_meters`.
///
/// Fails with [`DiscoveryError::ConfigError`] for a non-positive target and
/// [`DiscoveryError::DegenerateInput`] for fewer than 2 points. Cumulative arc
/// length is computed once and shared by every slice.
///
/// # Example
///
/// ```rust
/// use trail_discovery::{GpsPoint, segmenter};
///
/// // ~556 m due north
/// let trail = vec![GpsPoint::new(61.000, 10.0), GpsPoint::new(61.005, 10.0)];
/// let segmentation = segmenter::segment_polyline(&trail, 100.0).unwrap();
/// assert_eq!(segmentation.slices.len(), 5);
/// assert!(segmentation.dropped.is_empty());
/// ```
pub fn segment_polyline(points: &[GpsPoint], target_length_meters: f64) -> Result<Segmentation> {
    if !(target_length_meters.is_finite() && target_length_meters > 0.0) {
        return Err(DiscoveryError::ConfigError {
            message: format!("segment length must be positive, got {}", target_length_meters),
        });
    }
    if points.len() < 2 {
        return Err(DiscoveryError::DegenerateInput {
            trail_id: String::new(),
            point_count: points.len(),
            minimum_required: 2,
        });
    }

    let cumulative = cumulative_distances(points);
    let total_length = cumulative[cumulative.len() - 1];
    let count = segment_count(total_length, target_length_meters);

    let mut segmentation = Segmentation {
        slices: Vec::with_capacity(count as usize),
        dropped: Vec::new(),
        total_length,
    };

    for i in 0..count {
        let start_fraction = i as f64 / count as f64;
        let end_fraction = (i + 1) as f64 / count as f64;

        match subpath_along(points, &cumulative, start_fraction, end_fraction) {
            Ok(slice) => segmentation.slices.push((i, slice)),
            Err(error) => {
                debug!("[Segmenter] Dropping slice {}/{}: {}", i, count, error);
                segmentation.dropped.push(DroppedSlice { segment_index: i, error });
            }
        }
    }

    Ok(segmentation)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight line due north of roughly `meters` length, `n` vertices.
    fn northward(meters: f64, n: usize) -> Vec<GpsPoint> {
        let span = meters / 111_194.93;
        (0..n)
            .map(|i| GpsPoint::new(61.0 + span * i as f64 / (n - 1) as f64, 10.0))
            .collect()
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(0.0, 100.0), 1);
        assert_eq!(segment_count(99.9, 100.0), 1);
        assert_eq!(segment_count(250.0, 100.0), 2);
        assert_eq!(segment_count(1005.0, 100.0), 10);
    }

    #[test]
    fn test_short_trail_yields_one_slice() {
        let trail = northward(40.0, 3);
        let segmentation = segment_polyline(&trail, 100.0).unwrap();
        assert_eq!(segmentation.slices.len(), 1);
        assert_eq!(segmentation.slices[0].1, trail);
    }

    #[test]
    fn test_slices_are_contiguous() {
        let trail = northward(730.0, 9);
        let segmentation = segment_polyline(&trail, 100.0).unwrap();
        assert_eq!(segmentation.slices.len(), 7);
        for pair in segmentation.slices.windows(2) {
            assert_eq!(pair[0].1.last(), pair[1].1.first());
        }
        let indices: Vec<u32> = segmentation.slices.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_rejects_bad_target() {
        let trail = northward(500.0, 2);
        assert!(matches!(segment_polyline(&trail, 0.0), Err(DiscoveryError::ConfigError { .. })));
        assert!(matches!(segment_polyline(&trail, f64::NAN), Err(DiscoveryError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_single_point() {
        let result = segment_polyline(&[GpsPoint::new(61.0, 10.0)], 100.0);
        assert!(matches!(
            result,
            Err(DiscoveryError::DegenerateInput { point_count: 1, .. })
        ));
    }

    #[test]
    fn test_unmeasurable_trail_drops_slices() {
        let trail = vec![
            GpsPoint::new(61.0, 10.0),
            GpsPoint::new(f64::NAN, 10.0),
            GpsPoint::new(61.01, 10.0),
        ];
        let segmentation = segment_polyline(&trail, 100.0).unwrap();
        assert!(segmentation.slices.is_empty());
        assert!(segmentation.total_length.is_nan());
        assert_eq!(segmentation.dropped.len(), 1);
        assert_eq!(segmentation.dropped[0].segment_index, 0);
        assert!(matches!(segmentation.dropped[0].error, DiscoveryError::Geometry { .. }));
    }

    #[test]
    fn test_many_short_slices() {
        let trail = northward(1000.5, 50);
        let segmentation = segment_polyline(&trail, 1.0).unwrap();
        assert_eq!(segmentation.slices.len(), 1000);
        assert!(segmentation.dropped.is_empty());
        let sum: f64 = segmentation
            .slices
            .iter()
            .map(|(_, slice)| crate::geo_utils::polyline_length(slice))
            .sum();
        assert!((sum - segmentation.total_length).abs() < 1e-6 * segmentation.total_length);
    }
}
