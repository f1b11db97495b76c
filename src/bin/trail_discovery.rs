//! trail-discovery CLI - match a GPX track against a trail network
//!
//! Usage:
//!   trail-discovery --trails <network.geojson> --track <activity.gpx> [--output <segments.geojson>]
//!
//! Prints total and discovered trail length and, with `--output`, writes the
//! classified segments as GeoJSON for a map renderer.

use clap::Parser;
use gpx::{read, Gpx};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trail_discovery::{
    geo_utils::compute_center,
    geojson::{parse_trails, result_to_feature_collection},
    Bounds, BufferModel, DiscoveryConfig, DiscoveryError, DiscoveryResult, DiscoveryWarning, GpsPoint,
    Result,
};

#[derive(Parser)]
#[command(name = "trail-discovery")]
#[command(about = "Compute how much of a trail network a GPS track has discovered", long_about = None)]
struct Cli {
    /// Trail network as a GeoJSON FeatureCollection of LineStrings
    #[arg(long)]
    trails: PathBuf,

    /// Recorded track (GPX)
    #[arg(long)]
    track: PathBuf,

    /// Target segment length in meters
    #[arg(long, default_value = "100")]
    segment_length: f64,

    /// Buffer radius around each segment in meters
    #[arg(long, default_value = "50")]
    buffer: f64,

    /// Scale the buffer's longitude axis by cos(latitude)
    #[arg(long)]
    latitude_corrected: bool,

    /// Write classified segments to this GeoJSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = DiscoveryConfig {
        segment_length_meters: cli.segment_length,
        buffer_meters: cli.buffer,
        buffer_model: if cli.latitude_corrected {
            BufferModel::LatitudeCorrected
        } else {
            BufferModel::FlatDegrees
        },
    };
    config.validate()?;

    println!("\n{}", "=".repeat(60));
    println!("Trail discovery");
    println!("{}", "=".repeat(60));

    let trails = parse_trails(&fs::read_to_string(&cli.trails)?)?;
    println!("  [OK] {} trails loaded from {}", trails.len(), cli.trails.display());

    let track = load_gpx_track(&cli.track)?;
    println!("  [OK] {} track points loaded from {}", track.len(), cli.track.display());
    print_track_extent(&track);

    #[cfg(feature = "parallel")]
    let result = trail_discovery::discover_trails_parallel(&trails, &track, &config)?;

    #[cfg(not(feature = "parallel"))]
    let result = trail_discovery::discover_trails(&trails, &track, &config)?;

    print_report(&result, cli.verbose);

    if let Some(output) = &cli.output {
        let writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(writer, &result_to_feature_collection(&result))?;
        println!("\n  Segments written to {}", output.display());
    }

    Ok(())
}

/// All points of all tracks and track segments, in file order.
fn load_gpx_track(path: &Path) -> Result<Vec<GpsPoint>> {
    let reader = BufReader::new(File::open(path)?);
    let gpx: Gpx = read(reader).map_err(|e| DiscoveryError::InvalidInput {
        message: format!("failed to parse {}: {}", path.display(), e),
    })?;

    let points: Vec<GpsPoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .map(|waypoint| {
            let point = waypoint.point();
            GpsPoint::new(point.y(), point.x())
        })
        .collect();

    Ok(points)
}

/// Track bounding box and the mean position a map view would center on.
fn print_track_extent(track: &[GpsPoint]) {
    let valid: Vec<GpsPoint> = track.iter().copied().filter(GpsPoint::is_valid).collect();
    let bounds = match Bounds::from_points(&valid) {
        Some(bounds) => bounds,
        None => return,
    };
    let center = compute_center(&valid);
    println!(
        "       lat {:.5}..{:.5}, lng {:.5}..{:.5}, center ({:.5}, {:.5})",
        bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng, center.latitude, center.longitude
    );
}

fn print_report(result: &DiscoveryResult, verbose: bool) {
    let stats = &result.stats;

    println!(
        "\n  Segments:   {} ({} visited, {} not visited)",
        stats.total_segments,
        stats.visited_segments,
        stats.total_segments - stats.visited_segments
    );
    println!("  Total:      {:.2} km", stats.total_km());
    println!("  Visited:    {:.2} km", stats.visited_km());
    println!("  Discovery:  {:.1}%", stats.discovery_percent());

    if result.warnings.is_empty() {
        return;
    }

    let empty_track = result.warnings.contains(&DiscoveryWarning::EmptyTrack);
    println!("\n  Warnings:");
    if empty_track {
        println!("    track has no valid points");
    }
    println!(
        "    {} degenerate trails, {} dropped slices",
        stats.degenerate_trails, stats.dropped_slices
    );

    if verbose {
        for warning in &result.warnings {
            match warning {
                DiscoveryWarning::EmptyTrack => {}
                DiscoveryWarning::DegenerateTrail { trail_id, point_count } => {
                    println!("    - trail {} has {} valid points", trail_id, point_count);
                }
                DiscoveryWarning::DroppedSlice { trail_id, segment_index, reason } => {
                    println!("    - trail {} slice {}: {}", trail_id, segment_index, reason);
                }
            }
        }
    }
}
