//! Basic example of discovering a small trail network.
//!
//! Run with: cargo run --example basic_discovery

use trail_discovery::{discover_trails, DiscoveryConfig, GpsPoint, Trail, TrailProperties};

fn named(name: &str) -> TrailProperties {
    let mut properties = TrailProperties::new();
    properties.insert("name".into(), name.into());
    properties
}

fn main() {
    // Two trails near Gausdal: one heading north, one heading east
    let north = Trail::new(
        "way/1",
        vec![
            GpsPoint::new(61.2000, 10.1000),
            GpsPoint::new(61.2040, 10.1000),
            GpsPoint::new(61.2080, 10.1010),
        ],
        named("Nordløypa"),
    );
    let east = Trail::new(
        "way/2",
        vec![
            GpsPoint::new(61.2000, 10.1000),
            GpsPoint::new(61.2000, 10.1080),
            GpsPoint::new(61.2010, 10.1160),
        ],
        named("Østløypa"),
    );

    // A track that skis the first half of the northern trail, sampled every ~10 m
    let track: Vec<GpsPoint> = (0..45)
        .map(|i| GpsPoint::new(61.2000 + i as f64 * 0.0001, 10.10005))
        .collect();

    let config = DiscoveryConfig::default();
    let trails = vec![north, east];

    println!("Trail Discovery Example\n");
    println!(
        "Config: segment_length={}m, buffer={}m, model={:?}\n",
        config.segment_length_meters, config.buffer_meters, config.buffer_model
    );

    let result = match discover_trails(&trails, &track, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Discovery failed: {}", e);
            return;
        }
    };

    for trail in &trails {
        let segments: Vec<_> = result.segments.iter().filter(|s| s.key.trail_id == trail.id).collect();
        let visited = segments.iter().filter(|s| s.visited).count();
        println!(
            "  {} ({}): {}/{} segments visited",
            trail.name().unwrap_or("unnamed"),
            trail.id,
            visited,
            segments.len()
        );
    }

    let summary = result.stats.summary();
    println!(
        "\nDiscovered {:.1}% ({:.2} of {:.2} km)",
        summary.discovery_percent, summary.visited_km, summary.total_km
    );
}
