//! # Trail Discovery
//!
//! Match a recorded GPS track against a network of trail geometries and report
//! how much of the network has been discovered.
//!
//! This library provides:
//! - Great-circle length and proportional sub-paths of polylines
//! - Fixed-length segmentation of trails
//! - Buffer-based visitation tests backed by an R-tree over the track
//! - Discovery statistics (total km, visited km, discovery percentage)
//! - A GeoJSON boundary for reading trails and writing classified segments
//!
//! ## Features
//!
//! - **`parallel`** - Match trails in parallel with rayon
//! - **`cli`** - Build the `trail-discovery` command-line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use trail_discovery::{discover_trails, DiscoveryConfig, GpsPoint, Trail};
//!
//! // ~556 m trail heading north
//! let trail = Trail::new(
//!     "way/1",
//!     vec![GpsPoint::new(61.000, 10.0), GpsPoint::new(61.005, 10.0)],
//!     Default::default(),
//! );
//!
//! // A track that only covers the southern end
//! let track = vec![GpsPoint::new(61.0001, 10.0), GpsPoint::new(61.0005, 10.0)];
//!
//! let result = discover_trails(&[trail], &track, &DiscoveryConfig::default()).unwrap();
//! println!(
//!     "Discovered {:.1}% ({:.2} of {:.2} km)",
//!     result.stats.discovery_percent(),
//!     result.stats.visited_km(),
//!     result.stats.total_km(),
//! );
//! assert!(result.stats.discovery_ratio > 0.0 && result.stats.discovery_ratio < 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod error;
pub use error::{DiscoveryError, Result};

pub mod geo_utils;

pub mod segmenter;
pub use segmenter::{segment_polyline, Segmentation};

pub mod buffer;
pub use buffer::{SegmentBuffer, TrackIndex};

pub mod matching;
pub use matching::{discover_trails, is_segment_visited};

#[cfg(feature = "parallel")]
pub use matching::discover_trails_parallel;

// GeoJSON input/output boundary
pub mod geojson;

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 position with latitude and longitude in decimal degrees.
///
/// # Example
/// ```
/// use trail_discovery::GpsPoint;
/// let point = GpsPoint::new(61.2, 10.1);
/// assert_eq!(point, GpsPoint::from_lon_lat([10.1, 61.2]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Create a point from GeoJSON `[longitude, latitude]` ordering.
    pub fn from_lon_lat(coords: [f64; 2]) -> Self {
        Self::new(coords[1], coords[0])
    }

    /// GeoJSON `[longitude, latitude]` ordering.
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Grow the box by separate latitude and longitude margins (degrees).
    pub fn expanded(&self, lat_margin: f64, lng_margin: f64) -> Self {
        Self {
            min_lat: self.min_lat - lat_margin,
            max_lat: self.max_lat + lat_margin,
            min_lng: self.min_lng - lng_margin,
            max_lng: self.max_lng + lng_margin,
        }
    }
}

/// Opaque property bag carried from a trail to its segments.
pub type TrailProperties = serde_json::Map<String, serde_json::Value>;

/// A named trail geometry.
///
/// Properties are not interpreted; they are shared with every segment cut
/// from this trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    /// Stable identifier (OSM id, feature id, or input index)
    pub id: String,
    /// Trail polyline, at least 2 positions to be segmentable
    pub geometry: Vec<GpsPoint>,
    /// Arbitrary properties (name, grooming, difficulty, ...)
    pub properties: Arc<TrailProperties>,
}

impl Trail {
    /// Create a trail.
    pub fn new(id: impl Into<String>, geometry: Vec<GpsPoint>, properties: TrailProperties) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Arc::new(properties),
        }
    }

    /// Geometry with invalid coordinates removed.
    pub fn valid_points(&self) -> Vec<GpsPoint> {
        self.geometry.iter().copied().filter(GpsPoint::is_valid).collect()
    }

    /// Trail name from the `name` property, if any.
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(|v| v.as_str())
    }
}

/// Stable identity of a segment across runs.
///
/// Segmentation is deterministic, so the same trail geometry and segment length
/// always produce the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub trail_id: String,
    pub segment_index: u32,
}

/// A fixed-length slice of a trail, classified as visited or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Trail id and slice position
    pub key: SegmentKey,
    /// Index of the originating trail in the input slice
    pub trail_index: usize,
    /// Slice geometry
    pub polyline: Vec<GpsPoint>,
    /// Haversine length of the slice in meters
    pub length_meters: f64,
    /// True if any track position fell strictly inside the slice's buffer
    pub visited: bool,
    /// Properties of the originating trail
    pub properties: Arc<TrailProperties>,
}

/// How the buffer radius in meters is turned into a planar tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferModel {
    /// `meters / 111000` degrees on both axes, regardless of latitude.
    #[default]
    FlatDegrees,
    /// Same latitude tolerance, with longitude differences scaled by
    /// `cos(latitude)` so the buffer is round on the ground.
    LatitudeCorrected,
}

/// Configuration for discovery matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Target segment length in meters. Smaller values raise resolution and
    /// cost roughly linearly.
    /// Default: 100.0 meters
    pub segment_length_meters: f64,

    /// Buffer radius around each segment in meters. A track position must be
    /// strictly closer than this to count as a visit.
    /// Default: 50.0 meters
    pub buffer_meters: f64,

    /// Meter-to-degree conversion used for the buffer.
    /// Default: [`BufferModel::FlatDegrees`]
    pub buffer_model: BufferModel,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            segment_length_meters: 100.0,
            buffer_meters: 50.0,
            buffer_model: BufferModel::FlatDegrees,
        }
    }
}

impl DiscoveryConfig {
    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if !(self.segment_length_meters.is_finite() && self.segment_length_meters > 0.0) {
            return Err(DiscoveryError::ConfigError {
                message: format!(
                    "segment_length_meters must be positive, got {}",
                    self.segment_length_meters
                ),
            });
        }
        if !(self.buffer_meters.is_finite() && self.buffer_meters >= 0.0) {
            return Err(DiscoveryError::ConfigError {
                message: format!("buffer_meters must be >= 0, got {}", self.buffer_meters),
            });
        }
        Ok(())
    }
}

/// Aggregate result of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// Sum of all segment lengths in meters
    pub total_length_meters: f64,
    /// Sum of visited segment lengths in meters
    pub visited_length_meters: f64,
    /// `visited / total`, or 0 when the total is 0
    pub discovery_ratio: f64,
    /// Number of segments produced
    pub total_segments: u32,
    /// Number of segments marked visited
    pub visited_segments: u32,
    /// Slices that could not be extracted and were skipped
    pub dropped_slices: u32,
    /// Trails with fewer than 2 valid positions
    pub degenerate_trails: u32,
}

impl DiscoveryStats {
    pub fn total_km(&self) -> f64 {
        self.total_length_meters / 1000.0
    }

    pub fn visited_km(&self) -> f64 {
        self.visited_length_meters / 1000.0
    }

    pub fn discovery_percent(&self) -> f64 {
        self.discovery_ratio * 100.0
    }

    /// Reporting record: `{total_km, visited_km, discovery_percent}`.
    pub fn summary(&self) -> DiscoverySummary {
        DiscoverySummary {
            total_km: self.total_km(),
            visited_km: self.visited_km(),
            discovery_percent: self.discovery_percent(),
        }
    }
}

/// Compact summary for reporting and UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub total_km: f64,
    pub visited_km: f64,
    pub discovery_percent: f64,
}

/// Non-fatal conditions encountered during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiscoveryWarning {
    /// The track had no valid positions; nothing can be visited.
    EmptyTrack,
    /// Trail skipped because it has fewer than 2 valid positions.
    DegenerateTrail { trail_id: String, point_count: usize },
    /// One slice of a trail could not be extracted.
    DroppedSlice {
        trail_id: String,
        segment_index: u32,
        reason: String,
    },
}

/// Classified segments plus statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Segments ordered by trail input order, then geometric order
    pub segments: Vec<Segment>,
    pub stats: DiscoveryStats,
    pub warnings: Vec<DiscoveryWarning>,
}

impl DiscoveryResult {
    /// Segments marked visited.
    pub fn visited_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.visited)
    }

    /// Segments not yet visited.
    pub fn unvisited_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| !s.visited)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(61.2, 10.1).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_lon_lat_ordering() {
        let p = GpsPoint::from_lon_lat([10.1, 61.2]);
        assert_eq!(p.latitude, 61.2);
        assert_eq!(p.longitude, 10.1);
        assert_eq!(p.to_lon_lat(), [10.1, 61.2]);
    }

    #[test]
    fn test_trail_valid_points() {
        let trail = Trail::new(
            "t",
            vec![
                GpsPoint::new(61.2, 10.1),
                GpsPoint::new(f64::NAN, 10.1),
                GpsPoint::new(61.3, 10.1),
            ],
            TrailProperties::new(),
        );
        assert_eq!(trail.valid_points().len(), 2);
        assert_eq!(trail.name(), None);
    }

    #[test]
    fn test_bounds_expanded() {
        assert!(Bounds::from_points(&[]).is_none());

        let bounds = Bounds::from_points(&[GpsPoint::new(61.0, 10.0), GpsPoint::new(61.1, 10.2)])
            .unwrap()
            .expanded(0.01, 0.02);
        assert!((bounds.min_lat - 60.99).abs() < 1e-9);
        assert!((bounds.max_lat - 61.11).abs() < 1e-9);
        assert!((bounds.min_lng - 9.98).abs() < 1e-9);
        assert!((bounds.max_lng - 10.22).abs() < 1e-9);
    }

    #[test]
    fn test_config_validation() {
        assert!(DiscoveryConfig::default().validate().is_ok());

        let zero_buffer = DiscoveryConfig { buffer_meters: 0.0, ..Default::default() };
        assert!(zero_buffer.validate().is_ok());

        let bad_length = DiscoveryConfig { segment_length_meters: 0.0, ..Default::default() };
        assert!(matches!(bad_length.validate(), Err(DiscoveryError::ConfigError { .. })));

        let bad_buffer = DiscoveryConfig { buffer_meters: -1.0, ..Default::default() };
        assert!(matches!(bad_buffer.validate(), Err(DiscoveryError::ConfigError { .. })));
    }

    #[test]
    fn test_stats_summary() {
        let stats = DiscoveryStats {
            total_length_meters: 2500.0,
            visited_length_meters: 500.0,
            discovery_ratio: 0.2,
            ..Default::default()
        };
        let summary = stats.summary();
        assert_eq!(summary.total_km, 2.5);
        assert_eq!(summary.visited_km, 0.5);
        assert!((summary.discovery_percent - 20.0).abs() < 1e-9);
    }
}
