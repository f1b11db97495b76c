//! # Discovery Matching
//!
//! Segments every trail, tests each segment against the track and aggregates
//! visited and total length into [`DiscoveryStats`].
//!
//! ## Algorithm
//! 1. Validate the configuration and index the track once (R-tree)
//! 2. For each trail, drop invalid positions and cut it into slices
//! 3. For each slice, build its buffer and look for a track position strictly inside
//! 4. Fold lengths in input order: every segment adds to the total, visited
//!    segments also add to the visited length
//!
//! Per-trail and per-slice failures are absorbed and reported as
//! [`DiscoveryWarning`]s. Only an invalid configuration stops a run.
//!
//! The run is a pure function of its inputs: no state survives between calls,
//! and the parallel variant folds in the same order as the sequential one.

use log::{debug, info, warn};
use std::time::Instant;

use crate::buffer::{SegmentBuffer, TrackIndex};
use crate::error::Result;
use crate::geo_utils::polyline_length;
use crate::segmenter::{segment_polyline, Segmentation};
use crate::{
    BufferModel, DiscoveryConfig, DiscoveryResult, DiscoveryStats, DiscoveryWarning, GpsPoint,
    Segment, SegmentKey, Trail,
};

/// Check whether a single segment was visited by a track.
///
/// Returns true iff at least one valid track position lies strictly inside the
/// planar buffer of `buffer_meters` around the segment. An empty track or a
/// zero buffer never visits anything.
///
/// # Example
/// ```
/// use trail_discovery::{is_segment_visited, BufferModel, GpsPoint};
///
/// let segment = vec![GpsPoint::new(61.000, 10.0), GpsPoint::new(61.001, 10.0)];
/// let track = vec![GpsPoint::new(61.0005, 10.0002)];
///
/// assert!(is_segment_visited(&segment, &track, 50.0, BufferModel::FlatDegrees));
/// assert!(!is_segment_visited(&segment, &[], 50.0, BufferModel::FlatDegrees));
/// ```
pub fn is_segment_visited(
    segment: &[GpsPoint],
    track: &[GpsPoint],
    buffer_meters: f64,
    model: BufferModel,
) -> bool {
    let buffer = SegmentBuffer::new(segment, buffer_meters, model);
    track.iter().any(|p| buffer.contains(p))
}

/// Per-trail output before aggregation.
struct TrailOutcome {
    segments: Vec<Segment>,
    warnings: Vec<DiscoveryWarning>,
    dropped_slices: u32,
    degenerate: bool,
}

/// Segment one trail and classify its slices.
fn match_trail(
    trail_index: usize,
    trail: &Trail,
    track: &TrackIndex,
    config: &DiscoveryConfig,
) -> TrailOutcome {
    let points = trail.valid_points();

    let segmentation = match segment_polyline(&points, config.segment_length_meters) {
        Ok(segmentation) => segmentation,
        Err(err) => {
            warn!("[Discovery] Skipping trail: {}", err.with_trail_id(&trail.id));
            return TrailOutcome {
                segments: Vec::new(),
                warnings: vec![DiscoveryWarning::DegenerateTrail {
                    trail_id: trail.id.clone(),
                    point_count: points.len(),
                }],
                dropped_slices: 0,
                degenerate: true,
            };
        }
    };

    classify_trail(trail_index, trail, segmentation, track, config)
}

/// Turn a trail's slices into classified segments and its dropped slices
/// into warnings.
fn classify_trail(
    trail_index: usize,
    trail: &Trail,
    segmentation: Segmentation,
    track: &TrackIndex,
    config: &DiscoveryConfig,
) -> TrailOutcome {
    let warnings: Vec<DiscoveryWarning> = segmentation
        .dropped
        .iter()
        .map(|dropped| DiscoveryWarning::DroppedSlice {
            trail_id: trail.id.clone(),
            segment_index: dropped.segment_index,
            reason: dropped.error.to_string(),
        })
        .collect();

    let segments: Vec<Segment> = segmentation
        .slices
        .into_iter()
        .map(|(segment_index, polyline)| {
            let buffer = SegmentBuffer::new(&polyline, config.buffer_meters, config.buffer_model);
            let visited = track.any_inside(&buffer);
            Segment {
                key: SegmentKey {
                    trail_id: trail.id.clone(),
                    segment_index,
                },
                trail_index,
                length_meters: polyline_length(&polyline),
                polyline,
                visited,
                properties: trail.properties.clone(),
            }
        })
        .collect();

    debug!(
        "[Discovery] Trail '{}': {:.0}m in {} segments, {} visited",
        trail.id,
        segmentation.total_length,
        segments.len(),
        segments.iter().filter(|s| s.visited).count()
    );

    TrailOutcome {
        segments,
        warnings,
        dropped_slices: segmentation.dropped.len() as u32,
        degenerate: false,
    }
}

/// Fold per-trail outcomes, in order, into the final result.
fn assemble(outcomes: Vec<TrailOutcome>, mut warnings: Vec<DiscoveryWarning>) -> DiscoveryResult {
    let mut stats = DiscoveryStats::default();
    let mut segments = Vec::new();

    for outcome in outcomes {
        stats.dropped_slices += outcome.dropped_slices;
        if outcome.degenerate {
            stats.degenerate_trails += 1;
        }
        warnings.extend(outcome.warnings);

        for segment in outcome.segments {
            stats.total_length_meters += segment.length_meters;
            stats.total_segments += 1;
            if segment.visited {
                stats.visited_length_meters += segment.length_meters;
                stats.visited_segments += 1;
            }
            segments.push(segment);
        }
    }

    stats.discovery_ratio = if stats.total_length_meters > 0.0 {
        stats.visited_length_meters / stats.total_length_meters
    } else {
        0.0
    };

    DiscoveryResult { segments, stats, warnings }
}

/// Index the track and record the empty-track warning if needed.
fn prepare_track(track: &[GpsPoint]) -> (TrackIndex, Vec<DiscoveryWarning>) {
    let index = TrackIndex::new(track);
    let mut warnings = Vec::new();
    if index.is_empty() {
        warn!(
            "[Discovery] Track has no valid positions ({} supplied); nothing can be visited",
            track.len()
        );
        warnings.push(DiscoveryWarning::EmptyTrack);
    }
    (index, warnings)
}

fn log_summary(result: &DiscoveryResult, trails: usize, started: Instant) {
    let stats = &result.stats;
    info!(
        "[Discovery] {} trails -> {} segments ({} visited, {} dropped, {} degenerate trails) in {}ms",
        trails,
        stats.total_segments,
        stats.visited_segments,
        stats.dropped_slices,
        stats.degenerate_trails,
        started.elapsed().as_millis()
    );
    info!(
        "[Discovery] {:.2} of {:.2} km discovered ({:.1}%)",
        stats.visited_km(),
        stats.total_km(),
        stats.discovery_percent()
    );
}

/// Match a whole trail network against a track.
///
/// Segments appear in trail input order, then in geometric order within each
/// trail. The call has no side effects beyond logging and always yields the
/// same result for the same inputs.
///
/// Fails only on an invalid configuration. Degenerate trails, dropped slices
/// and an empty track are reported in [`DiscoveryResult::warnings`].
///
/// # Example
/// ```
/// use trail_discovery::{discover_trails, DiscoveryConfig, GpsPoint, Trail};
///
/// let trails = vec![Trail::new(
///     "loop",
///     vec![GpsPoint::new(61.000, 10.0), GpsPoint::new(61.002, 10.0)],
///     Default::default(),
/// )];
/// let track = trails[0].geometry.clone();
///
/// let result = discover_trails(&trails, &track, &DiscoveryConfig::default()).unwrap();
/// assert_eq!(result.stats.total_segments, 2);
/// assert!((result.stats.discovery_percent() - 100.0).abs() < 1e-9);
///
/// let empty = discover_trails(&[], &track, &DiscoveryConfig::default()).unwrap();
/// assert_eq!(empty.stats.discovery_ratio, 0.0);
/// ```
pub fn discover_trails(
    trails: &[Trail],
    track: &[GpsPoint],
    config: &DiscoveryConfig,
) -> Result<DiscoveryResult> {
    config.validate()?;
    let started = Instant::now();

    info!(
        "[Discovery] Matching {} trails against {} track points (segment {}m, buffer {}m)",
        trails.len(),
        track.len(),
        config.segment_length_meters,
        config.buffer_meters
    );

    let (index, warnings) = prepare_track(track);

    let outcomes: Vec<TrailOutcome> = trails
        .iter()
        .enumerate()
        .map(|(i, trail)| match_trail(i, trail, &index, config))
        .collect();

    let result = assemble(outcomes, warnings);
    log_summary(&result, trails.len(), started);
    Ok(result)
}

/// Parallel version of [`discover_trails`].
///
/// Trails are matched concurrently with rayon; aggregation still runs in input
/// order, so the result is identical to the sequential call.
#[cfg(feature = "parallel")]
pub fn discover_trails_parallel(
    trails: &[Trail],
    track: &[GpsPoint],
    config: &DiscoveryConfig,
) -> Result<DiscoveryResult> {
    use rayon::prelude::*;

    config.validate()?;
    let started = Instant::now();

    info!(
        "[Discovery] Matching {} trails in parallel against {} track points",
        trails.len(),
        track.len()
    );

    let (index, warnings) = prepare_track(track);

    let outcomes: Vec<TrailOutcome> = trails
        .par_iter()
        .enumerate()
        .map(|(i, trail)| match_trail(i, trail, &index, config))
        .collect();

    let result = assemble(outcomes, warnings);
    log_summary(&result, trails.len(), started);
    Ok(result)
}
