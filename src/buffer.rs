//! Planar buffers around segments and an R-tree over the track.
//!
//! A [`SegmentBuffer`] is the exact round-capped buffer of a polyline in a
//! planar lon/lat frame: a position is inside iff its planar distance to the
//! polyline is strictly less than the radius. [`TrackIndex`] narrows the
//! candidate positions with the buffer's envelope before that test runs.

use geo::{Closest, ClosestPoint, Coord, LineString, Point};
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{compute_bounds, compute_center, longitude_scale, meters_to_degrees};
use crate::{BufferModel, GpsPoint};

// =============================================================================
// R-tree Indexed Track Points
// =============================================================================

/// A track position with its index for R-tree queries
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    point: GpsPoint,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.longitude, self.point.latitude])
    }
}

/// Spatial index over the valid positions of a recorded track.
pub struct TrackIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl TrackIndex {
    /// Build the index. Invalid positions are skipped.
    pub fn new(track: &[GpsPoint]) -> Self {
        let indexed: Vec<IndexedPoint> = track
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_valid())
            .map(|(idx, p)| IndexedPoint { idx, point: *p })
            .collect();
        let len = indexed.len();
        Self {
            tree: RTree::bulk_load(indexed),
            len,
        }
    }

    /// Number of indexed positions.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if any indexed position lies strictly inside the buffer.
    pub fn any_inside(&self, buffer: &SegmentBuffer) -> bool {
        if self.is_empty() || buffer.is_empty() {
            return false;
        }
        self.tree
            .locate_in_envelope_intersecting(&buffer.envelope())
            .any(|candidate| buffer.contains(&candidate.point))
    }

    /// Original track indices of the positions inside the buffer, ascending.
    pub fn positions_inside(&self, buffer: &SegmentBuffer) -> Vec<usize> {
        if buffer.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&buffer.envelope())
            .filter(|candidate| buffer.contains(&candidate.point))
            .map(|candidate| candidate.idx)
            .collect();
        hits.sort_unstable();
        hits
    }
}

// =============================================================================
// Segment Buffer
// =============================================================================

/// Planar tolerance region around a segment polyline.
#[derive(Debug, Clone)]
pub struct SegmentBuffer {
    /// Segment vertices in the projected frame, consecutive duplicates removed
    projected: Vec<Coord<f64>>,
    /// Radius in projected units (degrees of latitude)
    radius: f64,
    /// Factor applied to longitudes before measuring
    lng_scale: f64,
    /// Search box in lon/lat
    envelope: AABB<[f64; 2]>,
}

impl SegmentBuffer {
    /// Build the buffer of `polyline` with a radius of `buffer_meters`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trail_discovery::{BufferModel, GpsPoint, SegmentBuffer};
    ///
    /// let segment = vec![GpsPoint::new(61.000, 10.0), GpsPoint::new(61.001, 10.0)];
    /// let buffer = SegmentBuffer::new(&segment, 50.0, BufferModel::FlatDegrees);
    ///
    /// assert!(buffer.contains(&GpsPoint::new(61.0005, 10.0003)));
    /// assert!(!buffer.contains(&GpsPoint::new(61.0005, 10.0010)));
    /// ```
    pub fn new(polyline: &[GpsPoint], buffer_meters: f64, model: BufferModel) -> Self {
        let mean_lat = compute_center(polyline).latitude;
        let lng_scale = longitude_scale(model, mean_lat);
        let (radius, lng_margin) = meters_to_degrees(buffer_meters.max(0.0), model, mean_lat);

        let mut projected: Vec<Coord<f64>> = polyline
            .iter()
            .map(|p| Coord { x: p.longitude * lng_scale, y: p.latitude })
            .collect();
        projected.dedup();

        let bounds = compute_bounds(polyline).expanded(radius, lng_margin);
        let envelope = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );

        Self { projected, radius, lng_scale, envelope }
    }

    /// True when no position can ever be inside (zero radius or no geometry).
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0 || self.projected.is_empty()
    }

    /// Lon/lat box enclosing the whole buffer.
    pub fn envelope(&self) -> AABB<[f64; 2]> {
        self.envelope
    }

    /// Planar distance from a position to the segment, in projected degrees.
    pub fn distance_to(&self, point: &GpsPoint) -> f64 {
        let query = Coord { x: point.longitude * self.lng_scale, y: point.latitude };

        match self.projected.as_slice() {
            [] => f64::INFINITY,
            [only] => planar_distance(*only, query),
            coords => {
                let line = LineString::new(coords.to_vec());
                match line.closest_point(&Point::from(query)) {
                    Closest::Intersection(_) => 0.0,
                    Closest::SinglePoint(p) => planar_distance(p.0, query),
                    Closest::Indeterminate => coords
                        .iter()
                        .map(|c| planar_distance(*c, query))
                        .fold(f64::INFINITY, f64::min),
                }
            }
        }
    }

    /// Strict containment: boundary points are outside.
    pub fn contains(&self, point: &GpsPoint) -> bool {
        if self.is_empty() || !point.is_valid() {
            return false;
        }
        self.distance_to(point) < self.radius
    }
}

fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
