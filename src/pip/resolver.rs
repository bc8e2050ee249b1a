//! Resolves points to counties against the spatial index.

use geo::line_measures::Distance;
use geo::{Contains, Euclidean, Point};
use std::sync::Arc;
use tracing::debug;

use super::CountySpatialIndex;
use crate::models::{CountyGeometry, Fips};

/// Default boundary tolerance, in coordinate degrees.
///
/// TopoJSON-derived boundaries carry small gaps and seams versus real-world
/// point coordinates; points within this distance of a county boundary are
/// assigned to that county. Policy constant, not a derived quantity.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// County assignment resolver.
///
/// Exact containment wins; otherwise the nearest geometry within the
/// boundary tolerance; otherwise the point stays unassigned.
pub struct AssignmentResolver {
    index: CountySpatialIndex,
    tolerance: f64,
}

impl AssignmentResolver {
    pub fn new(index: CountySpatialIndex, tolerance: f64) -> Self {
        Self { index, tolerance }
    }

    /// Resolve a point to a county FIPS code, or `None` if no county is
    /// within tolerance.
    pub fn resolve(&self, lon: f64, lat: f64) -> Option<Fips> {
        let point = Point::new(lon, lat);

        // Exact containment among bounding-box hits. Neighboring counties
        // can both report a hit near shared corners; the lowest FIPS wins
        // so reruns agree.
        let mut containing: Option<&Arc<CountyGeometry>> = None;
        for candidate in self.index.covering_candidates(lon, lat) {
            if candidate.county.geometry.contains(&point) {
                match containing {
                    Some(current) if current.fips <= candidate.county.fips => {}
                    _ => containing = Some(&candidate.county),
                }
            }
        }
        if let Some(county) = containing {
            return Some(county.fips.clone());
        }

        // Near-boundary fallback: walk candidates in box-distance order and
        // keep the geometry closest to the point. Once the box alone is
        // farther than the tolerance, no later candidate can beat it.
        let mut best: Option<(f64, &Arc<CountyGeometry>)> = None;
        for (candidate, box_d2) in self.index.nearest_candidates(lon, lat) {
            if box_d2.sqrt() > self.tolerance {
                break;
            }
            let distance = Euclidean.distance(&point, &candidate.county.geometry);
            if distance >= self.tolerance {
                continue;
            }
            let closer = match &best {
                Some((best_distance, best_county)) => {
                    distance < *best_distance
                        || (distance == *best_distance
                            && candidate.county.fips < best_county.fips)
                }
                None => true,
            };
            if closer {
                best = Some((distance, &candidate.county));
            }
        }

        match best {
            Some((distance, county)) => {
                debug!(
                    "Point ({}, {}) assigned to {} via boundary fallback ({:.5} deg)",
                    lon, lat, county.fips, distance
                );
                Some(county.fips.clone())
            }
            None => None,
        }
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &CountySpatialIndex {
        &self.index
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountyGeometry;
    use geo::{Coord, LineString, MultiPolygon, Polygon};

    fn ring(points: &[[f64; 2]]) -> LineString<f64> {
        LineString::new(points.iter().map(|&[x, y]| Coord { x, y }).collect())
    }

    fn rect(fips: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> CountyGeometry {
        CountyGeometry {
            fips: Fips::normalize(fips),
            geometry: MultiPolygon::new(vec![Polygon::new(
                ring(&[
                    [min_x, min_y],
                    [min_x, max_y],
                    [max_x, max_y],
                    [max_x, min_y],
                    [min_x, min_y],
                ]),
                vec![],
            )]),
        }
    }

    fn square(fips: &str, min: f64, max: f64) -> CountyGeometry {
        rect(fips, min, min, max, max)
    }

    fn resolver(counties: Vec<CountyGeometry>) -> AssignmentResolver {
        AssignmentResolver::new(CountySpatialIndex::build(counties), DEFAULT_TOLERANCE)
    }

    #[test]
    fn test_centroid_is_contained() {
        let resolver = resolver(vec![square("00001", 0.0, 10.0)]);
        assert_eq!(
            resolver.resolve(5.0, 5.0),
            Some(Fips::normalize("00001"))
        );
    }

    #[test]
    fn test_far_point_is_unassigned() {
        let resolver = resolver(vec![square("00001", 0.0, 10.0)]);
        assert_eq!(resolver.resolve(20.0, 20.0), None);
    }

    #[test]
    fn test_near_boundary_point_falls_back() {
        // Just outside the square, but within 0.01 of its boundary
        let resolver = resolver(vec![square("00001", 0.0, 10.0)]);
        assert_eq!(
            resolver.resolve(10.005, 5.0),
            Some(Fips::normalize("00001"))
        );
    }

    #[test]
    fn test_point_beyond_tolerance_is_unassigned() {
        let resolver = resolver(vec![square("00001", 0.0, 10.0)]);
        assert_eq!(resolver.resolve(10.02, 5.0), None);
    }

    #[test]
    fn test_point_in_hole_is_outside() {
        let donut = CountyGeometry {
            fips: Fips::normalize("00001"),
            geometry: MultiPolygon::new(vec![Polygon::new(
                ring(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]),
                vec![ring(&[
                    [4.0, 4.0],
                    [4.0, 6.0],
                    [6.0, 6.0],
                    [6.0, 4.0],
                    [4.0, 4.0],
                ])],
            )]),
        };
        let resolver = resolver(vec![donut]);
        // Deep inside the hole: not contained, and the hole boundary is
        // farther away than the tolerance
        assert_eq!(resolver.resolve(5.0, 5.0), None);
        // Inside the polygon proper
        assert_eq!(
            resolver.resolve(2.0, 2.0),
            Some(Fips::normalize("00001"))
        );
    }

    #[test]
    fn test_gap_between_counties_assigns_nearest() {
        // Two counties separated by a thin digitization seam
        let resolver = resolver(vec![
            rect("00001", 0.0, 0.0, 10.0, 10.0),
            rect("00002", 10.004, 0.0, 20.0, 10.0),
        ]);
        // 0.003 from the left county, 0.001 from the right one
        assert_eq!(
            resolver.resolve(10.003, 5.0),
            Some(Fips::normalize("00002"))
        );
    }

    #[test]
    fn test_shared_edge_breaks_tie_on_lowest_fips() {
        let resolver = resolver(vec![
            rect("00002", 0.0, 0.0, 10.0, 10.0),
            rect("00001", 10.0, 0.0, 20.0, 10.0),
        ]);
        // On the shared edge both distances are zero; lowest FIPS wins
        assert_eq!(
            resolver.resolve(10.0, 5.0),
            Some(Fips::normalize("00001"))
        );
    }

    #[test]
    fn test_unclosed_geometry_is_never_a_candidate() {
        // Feature "2" references an arc that does not close its ring, so
        // validation drops it before the index is built
        let topology: crate::topo::Topology = serde_json::from_str(
            r#"{
                "arcs": [
                    [[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]],
                    [[20, 20], [20, 30], [30, 30]]
                ],
                "objects": {
                    "counties": {
                        "type": "GeometryCollection",
                        "geometries": [
                            {"type": "Polygon", "id": "1", "arcs": [[0]]},
                            {"type": "Polygon", "id": "2", "arcs": [[1]]}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let (features, _) = crate::topo::decode_object(&topology, "counties").unwrap();
        let (counties, stats) = crate::topo::validate_features(features);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.rejected, 1);

        let resolver =
            AssignmentResolver::new(CountySpatialIndex::build(counties), DEFAULT_TOLERANCE);
        assert_eq!(resolver.index().len(), 1);
        assert_eq!(resolver.resolve(5.0, 5.0), Some(Fips::normalize("00001")));
        // Inside the dropped feature's footprint: nothing to assign to
        assert_eq!(resolver.resolve(25.0, 25.0), None);
    }

    #[test]
    fn test_resolver_is_idempotent() {
        let resolver = resolver(vec![square("00001", 0.0, 10.0), square("00002", 12.0, 20.0)]);
        let probes = [(5.0, 5.0), (10.005, 5.0), (11.0, 5.0), (25.0, 25.0)];
        let first: Vec<_> = probes.iter().map(|&(x, y)| resolver.resolve(x, y)).collect();
        let second: Vec<_> = probes.iter().map(|&(x, y)| resolver.resolve(x, y)).collect();
        assert_eq!(first, second);
    }
}
