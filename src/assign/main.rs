//! County assignment pipeline.
//!
//! Downloads the county topology, decodes it into polygons, builds the
//! spatial index, assigns pharmacy points to counties and writes the
//! per-county density histogram.

mod config;
mod points;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mortar::density::assign_all;
use mortar::fetch::TopologyFetcher;
use mortar::pip::{AssignmentResolver, CountySpatialIndex};
use mortar::topo::{decode_object, validate_features};

use crate::config::Config;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "assign")]
#[command(about = "Assign pharmacy points to counties and build the density histogram")]
struct Args {
    /// Optional TOML config for data-source locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Point list (JSON array of [lon, lat, status] triples)
    #[arg(long)]
    points: Option<PathBuf>,

    /// County topology URL
    #[arg(long)]
    counties_url: Option<String>,

    /// Local cache path for the downloaded topology
    #[arg(long)]
    counties_cache: Option<PathBuf>,

    /// Geometry collection to assign against
    #[arg(long)]
    object: Option<String>,

    /// Boundary tolerance in coordinate degrees
    #[arg(long)]
    tolerance: Option<f64>,

    /// Output path for the density histogram
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // CLI flags override the config file
    if let Some(points) = args.points {
        config.sources.points_path = points;
    }
    if let Some(url) = args.counties_url {
        config.sources.counties_url = url;
    }
    if let Some(cache) = args.counties_cache {
        config.sources.counties_cache = cache;
    }
    if let Some(object) = args.object {
        config.assign.object = object;
    }
    if let Some(tolerance) = args.tolerance {
        config.assign.tolerance = tolerance;
    }
    if let Some(output) = args.output {
        config.output.density_path = output;
    }

    info!("Mortar county assignment");

    // Load the topology and decode it into county geometries
    let fetcher = TopologyFetcher::new();
    let topology = fetcher
        .load(&config.sources.counties_url, &config.sources.counties_cache)
        .await?;
    info!("Topology loaded: {} arcs", topology.arcs.len());

    let (features, decode_stats) = decode_object(&topology, &config.assign.object)?;
    info!(
        "Decoded {} features ({} skipped: {} unsupported type, {} decode failures)",
        features.len(),
        decode_stats.skipped_type + decode_stats.skipped_decode,
        decode_stats.skipped_type,
        decode_stats.skipped_decode
    );

    let (counties, validation_stats) = validate_features(features);
    info!(
        "{} valid county geometries ({} rejected)",
        counties.len(),
        validation_stats.rejected
    );
    if counties.is_empty() {
        anyhow::bail!("No valid county geometries to index");
    }

    // Build the index once; it is immutable for the rest of the run
    let index = CountySpatialIndex::build(counties);
    let resolver = AssignmentResolver::new(index, config.assign.tolerance);

    // Load points and assign
    let points = points::load_points(&config.sources.points_path)?;
    info!("{} points loaded", points.len());

    let pb = ProgressBar::new(points.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let (density, summary) = assign_all(&resolver, &points, Some(&pb));
    pb.finish_and_clear();

    report::log_summary(&decode_stats, &validation_stats, &summary, &density);
    report::write_density(&config.output.density_path, &density)?;

    Ok(())
}
