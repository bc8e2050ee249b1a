//! Per-county histogram aggregation.
//!
//! Assignment results fold into a sparse map of count vectors, one per
//! county: `[total, active, likely_active, uncertain, likely_closed]`.

use hashbrown::HashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::{Fips, PharmacyPoint, PharmacyStatus};
use crate::pip::AssignmentResolver;

/// Count vector for one county: total plus one bucket per status code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountyCounts(pub [u64; 5]);

impl CountyCounts {
    /// Record one assigned point. Codes outside the known range count
    /// toward the total only.
    pub fn record(&mut self, status: Option<PharmacyStatus>) {
        self.0[0] += 1;
        if let Some(status) = status {
            self.0[1 + status.code()] += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.0[0]
    }

    fn merge(&mut self, other: &CountyCounts) {
        for (slot, value) in self.0.iter_mut().zip(other.0.iter()) {
            *slot += value;
        }
    }
}

/// Sparse per-county histogram. Records are created on first assignment.
#[derive(Debug, Clone, Default)]
pub struct DensityMap {
    counts: HashMap<Fips, CountyCounts>,
}

impl DensityMap {
    pub fn record(&mut self, fips: Fips, status: Option<PharmacyStatus>) {
        self.counts.entry(fips).or_default().record(status);
    }

    /// Merge another map into this one by summation. Commutative and
    /// associative, so shard merge order does not affect the result.
    pub fn merge(mut self, other: DensityMap) -> Self {
        for (fips, counts) in other.counts {
            self.counts.entry(fips).or_default().merge(&counts);
        }
        self
    }

    pub fn get(&self, fips: &Fips) -> Option<&CountyCounts> {
        self.counts.get(fips)
    }

    /// Number of counties with at least one assigned point
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fips, &CountyCounts)> {
        self.counts.iter()
    }

    /// Largest per-county total
    pub fn max_total(&self) -> Option<u64> {
        self.counts.values().map(CountyCounts::total).max()
    }

    /// Upper-median per-county total
    pub fn median_total(&self) -> Option<u64> {
        if self.counts.is_empty() {
            return None;
        }
        let mut totals: Vec<u64> = self.counts.values().map(CountyCounts::total).collect();
        totals.sort_unstable();
        Some(totals[totals.len() / 2])
    }
}

impl Serialize for DensityMap {
    /// Serializes sorted by FIPS so output files are reproducible.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&Fips, &CountyCounts)> = self.counts.iter().collect();
        entries.sort_by_key(|(fips, _)| *fips);

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (fips, counts) in entries {
            map.serialize_entry(fips, counts)?;
        }
        map.end()
    }
}

/// Outcome counters for one assignment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentSummary {
    pub assigned: u64,
    pub unassigned: u64,
}

impl AssignmentSummary {
    fn merge(mut self, other: AssignmentSummary) -> Self {
        self.assigned += other.assigned;
        self.unassigned += other.unassigned;
        self
    }
}

/// Assign every point and fold the results into a histogram.
///
/// Points are sharded across rayon workers, each folding a local map;
/// shards merge by summation at the end. The resolver is read-only, so the
/// result is independent of scheduling.
pub fn assign_all(
    resolver: &AssignmentResolver,
    points: &[PharmacyPoint],
    progress: Option<&ProgressBar>,
) -> (DensityMap, AssignmentSummary) {
    points
        .par_iter()
        .fold(
            || (DensityMap::default(), AssignmentSummary::default()),
            |(mut map, mut summary), point| {
                match resolver.resolve(point.lon, point.lat) {
                    Some(fips) => {
                        map.record(fips, point.status());
                        summary.assigned += 1;
                    }
                    None => summary.unassigned += 1,
                }
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (map, summary)
            },
        )
        .reduce(
            || (DensityMap::default(), AssignmentSummary::default()),
            |(map_a, summary_a), (map_b, summary_b)| {
                (map_a.merge(map_b), summary_a.merge(summary_b))
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountyGeometry;
    use crate::pip::{CountySpatialIndex, DEFAULT_TOLERANCE};
    use geo::{Coord, LineString, MultiPolygon, Polygon};

    fn square(fips: &str, min: f64, max: f64) -> CountyGeometry {
        let ring: Vec<Coord<f64>> = [[min, min], [min, max], [max, max], [max, min], [min, min]]
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        CountyGeometry {
            fips: Fips::normalize(fips),
            geometry: MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])]),
        }
    }

    fn two_county_resolver() -> AssignmentResolver {
        let index = CountySpatialIndex::build(vec![
            square("00001", 0.0, 10.0),
            square("00002", 12.0, 20.0),
        ]);
        AssignmentResolver::new(index, DEFAULT_TOLERANCE)
    }

    /// 100 synthetic points: 80 inside county 00001 cycling through all
    /// four statuses, 12 inside county 00002 with an out-of-range code,
    /// 8 in the void between boxes.
    fn synthetic_points() -> Vec<PharmacyPoint> {
        let mut points = Vec::new();
        for i in 0..80 {
            points.push(PharmacyPoint::new(1.0 + (i % 8) as f64, 5.0, (i % 4) as i64));
        }
        for _ in 0..12 {
            points.push(PharmacyPoint::new(15.0, 15.0, 9));
        }
        for _ in 0..8 {
            points.push(PharmacyPoint::new(11.0, 25.0, 0));
        }
        points
    }

    #[test]
    fn test_record_and_bucket() {
        let mut counts = CountyCounts::default();
        counts.record(Some(PharmacyStatus::Active));
        counts.record(Some(PharmacyStatus::LikelyClosed));
        counts.record(None);
        assert_eq!(counts.0, [3, 1, 0, 0, 1]);
    }

    #[test]
    fn test_aggregation_totals_are_consistent() {
        let resolver = two_county_resolver();
        let points = synthetic_points();
        let (density, summary) = assign_all(&resolver, &points, None);

        assert_eq!(summary.assigned, 92);
        assert_eq!(summary.unassigned, 8);
        assert_eq!(summary.assigned + summary.unassigned, points.len() as u64);
        assert_eq!(density.len(), 2);

        // Per-county total matches the sum of its buckets where all codes
        // are in range
        let first = density.get(&Fips::normalize("00001")).unwrap();
        assert_eq!(first.total(), 80);
        assert_eq!(first.0[1..].iter().sum::<u64>(), 80);
        assert_eq!(first.0, [80, 20, 20, 20, 20]);

        // Out-of-range codes count toward the total only
        let second = density.get(&Fips::normalize("00002")).unwrap();
        assert_eq!(second.0, [12, 0, 0, 0, 0]);
    }

    #[test]
    fn test_parallel_run_matches_serial_fold() {
        let resolver = two_county_resolver();
        let points = synthetic_points();
        let (parallel, parallel_summary) = assign_all(&resolver, &points, None);

        let mut serial = DensityMap::default();
        let mut serial_summary = AssignmentSummary::default();
        for point in &points {
            match resolver.resolve(point.lon, point.lat) {
                Some(fips) => {
                    serial.record(fips, point.status());
                    serial_summary.assigned += 1;
                }
                None => serial_summary.unassigned += 1,
            }
        }

        assert_eq!(parallel_summary, serial_summary);
        assert_eq!(parallel.len(), serial.len());
        for (fips, counts) in serial.iter() {
            assert_eq!(parallel.get(fips), Some(counts));
        }
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let resolver = two_county_resolver();
        let points = synthetic_points();
        let (first, first_summary) = assign_all(&resolver, &points, None);
        let (second, second_summary) = assign_all(&resolver, &points, None);

        assert_eq!(first_summary, second_summary);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_stats_and_serialization() {
        let mut density = DensityMap::default();
        for _ in 0..5 {
            density.record(Fips::normalize("2"), Some(PharmacyStatus::Active));
        }
        density.record(Fips::normalize("1"), Some(PharmacyStatus::Uncertain));
        density.record(Fips::normalize("3"), None);

        assert_eq!(density.max_total(), Some(5));
        assert_eq!(density.median_total(), Some(1));

        // Sorted by FIPS, arrays in bucket order
        assert_eq!(
            serde_json::to_string(&density).unwrap(),
            r#"{"00001":[1,0,0,1,0],"00002":[5,5,0,0,0],"00003":[1,0,0,0,0]}"#
        );
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut a = DensityMap::default();
        a.record(Fips::normalize("1"), Some(PharmacyStatus::Active));
        let mut b = DensityMap::default();
        b.record(Fips::normalize("1"), Some(PharmacyStatus::Uncertain));
        b.record(Fips::normalize("2"), None);

        let merged = a.merge(b);
        assert_eq!(merged.get(&Fips::normalize("1")).unwrap().0, [2, 1, 0, 1, 0]);
        assert_eq!(merged.len(), 2);
    }
}
