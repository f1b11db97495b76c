//! Example of matching a large synthetic network in parallel.
//!
//! Run with: cargo run --example parallel_discovery --features parallel

use std::time::Instant;
use trail_discovery::{
    discover_trails, discover_trails_parallel, DiscoveryConfig, GpsPoint, Trail, TrailProperties,
};

/// A grid of east-west trails, each ~2 km long with a vertex every ~50 m.
fn synthetic_network(rows: usize) -> Vec<Trail> {
    (0..rows)
        .map(|row| {
            let lat = 61.0 + row as f64 * 0.002;
            let points = (0..=40)
                .map(|i| GpsPoint::new(lat, 10.0 + i as f64 * 0.00093))
                .collect();
            Trail::new(format!("row-{}", row), points, TrailProperties::new())
        })
        .collect()
}

fn main() {
    println!("Parallel Trail Discovery Example\n");

    let trails = synthetic_network(500);

    // Diagonal track crossing many rows
    let track: Vec<GpsPoint> = (0..20_000)
        .map(|i| GpsPoint::new(61.0 + i as f64 * 0.00005, 10.0 + i as f64 * 0.000002))
        .collect();

    let config = DiscoveryConfig::default();

    let start = Instant::now();
    let sequential = match discover_trails(&trails, &track, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Discovery failed: {}", e);
            return;
        }
    };
    println!("Sequential: {} segments in {:?}", sequential.stats.total_segments, start.elapsed());

    let start = Instant::now();
    let parallel = match discover_trails_parallel(&trails, &track, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Discovery failed: {}", e);
            return;
        }
    };
    println!("Parallel:   {} segments in {:?}", parallel.stats.total_segments, start.elapsed());

    println!("\nIdentical results: {}", sequential == parallel);
    println!(
        "Discovered {:.2}% ({} of {} segments)",
        parallel.stats.discovery_percent(),
        parallel.stats.visited_segments,
        parallel.stats.total_segments
    );
}
