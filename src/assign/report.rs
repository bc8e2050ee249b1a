//! Density output and run summary reporting.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use mortar::density::{AssignmentSummary, DensityMap};
use mortar::topo::{DecodeStats, ValidationStats};

/// Write the per-county histogram as compact JSON.
pub fn write_density(path: &Path, density: &DensityMap) -> Result<()> {
    let body = serde_json::to_string(density).context("Failed to serialize density map")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(path, &body)
        .with_context(|| format!("Failed to write density output {}", path.display()))?;
    info!("Wrote {} ({} KB)", path.display(), body.len() / 1024);
    Ok(())
}

/// Log the run outcome: geometry counts, assignment counts, histogram stats.
pub fn log_summary(
    decode: &DecodeStats,
    validation: &ValidationStats,
    summary: &AssignmentSummary,
    density: &DensityMap,
) {
    info!("Assignment complete:");
    info!("  Assigned: {}", summary.assigned);
    info!("  Unassigned: {}", summary.unassigned);
    info!("  Counties with points: {}", density.len());
    if let Some(max) = density.max_total() {
        info!("  Max per county: {}", max);
    }
    if let Some(median) = density.median_total() {
        info!("  Median per county: {}", median);
    }
    info!(
        "  Geometries: {} valid, {} rejected, {} skipped ({} unsupported type, {} decode failures)",
        validation.valid,
        validation.rejected,
        decode.skipped_type + decode.skipped_decode,
        decode.skipped_type,
        decode.skipped_decode
    );
}
