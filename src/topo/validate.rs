//! Validity filtering and identifier normalization.

use geo::{Area, LineString, Polygon};
use serde_json::Value;
use tracing::debug;

use super::decode::DecodedFeature;
use crate::models::{CountyGeometry, Fips};

/// Tolerance for the first ≈ last ring-closure check.
const CLOSURE_EPS: f64 = 1e-9;

/// Counters for the validation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationStats {
    pub valid: usize,
    pub rejected: usize,
}

fn ring_is_closed(ring: &LineString<f64>) -> bool {
    match (ring.0.first(), ring.0.last()) {
        (Some(first), Some(last)) => {
            (first.x - last.x).abs() <= CLOSURE_EPS && (first.y - last.y).abs() <= CLOSURE_EPS
        }
        _ => false,
    }
}

fn polygon_is_valid(polygon: &Polygon<f64>) -> bool {
    let exterior = polygon.exterior();
    if exterior.0.len() < 4 || !ring_is_closed(exterior) {
        return false;
    }
    if polygon
        .interiors()
        .iter()
        .any(|ring| ring.0.len() < 4 || !ring_is_closed(ring))
    {
        return false;
    }
    // Degenerate (zero-area) outer ring
    Polygon::new(exterior.clone(), vec![]).unsigned_area() > 0.0
}

fn fips_from_id(id: &Value) -> Option<Fips> {
    match id {
        Value::String(s) if !s.trim().is_empty() => Some(Fips::normalize(s)),
        Value::Number(n) => Some(Fips::normalize(&n.to_string())),
        _ => None,
    }
}

/// Filter decoded features down to indexable county geometries.
///
/// Drops features with unclosed, too-short or degenerate rings and features
/// without a usable id; zero-pads the FIPS identifier of the survivors.
pub fn validate_features(features: Vec<DecodedFeature>) -> (Vec<CountyGeometry>, ValidationStats) {
    let mut counties = Vec::with_capacity(features.len());
    let mut stats = ValidationStats::default();

    for feature in features {
        let Some(fips) = feature.id.as_ref().and_then(fips_from_id) else {
            debug!("Rejecting feature without usable id: {:?}", feature.id);
            stats.rejected += 1;
            continue;
        };

        let polygons = &feature.geometry.0;
        if polygons.is_empty() || !polygons.iter().all(polygon_is_valid) {
            debug!("Rejecting invalid geometry for {}", fips);
            stats.rejected += 1;
            continue;
        }

        counties.push(CountyGeometry {
            fips,
            geometry: feature.geometry,
        });
        stats.valid += 1;
    }

    (counties, stats)
}
