#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for one-shot site computations.
//!
//! Loads a `GeoJSON` population layer from a file or URL, runs the
//! ring-buffer redistribution around the given site, logs the per-ring
//! totals, and optionally prints the full report as JSON on stdout for
//! downstream consumers.

use clap::Parser;
use ring_census_geometry::{AreaUnit, DistanceUnit, GeodesicGeometry, Srs};
use ring_census_site::{SiteInput, SiteOptions, compute_site};
use ring_census_source::{LayerFields, fetch::fetch_layer_json, layer::MemoryLayer};

#[derive(Parser)]
#[command(
    name = "ring_census",
    about = "Ring-buffer population redistribution around a site"
)]
struct Cli {
    /// Site latitude (WGS84)
    #[arg(long)]
    lat: f64,

    /// Site longitude (WGS84)
    #[arg(long)]
    lng: f64,

    /// Site name used in the report
    #[arg(long, default_value = "site")]
    name: String,

    /// Comma-separated ascending ring distances (e.g., "1,3,5")
    #[arg(long)]
    distances: String,

    /// Distance unit: miles, km, or m
    #[arg(long, default_value = "miles")]
    unit: DistanceUnit,

    /// Population layer: path to a `GeoJSON` file, or an http(s) URL
    /// returning a `FeatureCollection`
    #[arg(long)]
    layer: String,

    /// Property holding a stable feature identifier
    #[arg(long)]
    id_field: Option<String>,

    /// Property holding the population count
    #[arg(long, default_value = "POP")]
    population_field: String,

    /// Property holding the reference area
    #[arg(long, default_value = "AREA_SQMI")]
    area_field: String,

    /// Unit the reference areas are expressed in: sq-mi, sq-km, or sq-m
    #[arg(long, default_value = "sq-mi")]
    area_unit: AreaUnit,

    /// Maximum rings interpolated concurrently
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let distances = parse_distances(&cli.distances)?;

    let raw = if cli.layer.starts_with("http://") || cli.layer.starts_with("https://") {
        log::info!("Fetching population layer from {}", cli.layer);
        fetch_layer_json(&reqwest::Client::new(), &cli.layer).await?
    } else {
        std::fs::read_to_string(&cli.layer)?
    };

    let fields = LayerFields {
        id: cli.id_field,
        population: cli.population_field,
        area: cli.area_field,
    };
    let layer = MemoryLayer::from_geojson(&cli.layer, &raw, Srs::Wgs84, &fields)?;

    let provider = GeodesicGeometry::new(cli.area_unit);
    let input = SiteInput {
        name: cli.name,
        latitude: cli.lat,
        longitude: cli.lng,
        distances,
        unit: cli.unit,
    };
    let options = SiteOptions {
        concurrency: cli.concurrency,
    };

    let report = compute_site(&input, &layer, &provider, &options).await?;

    for ring in &report.rings {
        if ring.failed {
            log::warn!("{}: query failed, population not attributed", ring.label);
        } else {
            log::info!(
                "{}: {} people across {} areas",
                ring.label,
                ring.total_population,
                ring.records.len()
            );
        }
    }
    log::info!(
        "Total within {} {}: {} people{}",
        report
            .rings
            .last()
            .map_or(0.0, |ring| ring.outer_distance),
        report.unit,
        report.grand_total_population,
        if report.complete { "" } else { " (partial)" }
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Parses a comma-separated distance list; ordering and positivity are
/// validated by the site pipeline.
fn parse_distances(raw: &str) -> Result<Vec<f64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| format!("invalid distance '{s}': {e}"))
        })
        .collect()
}
