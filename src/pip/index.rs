//! Spatial index for fast county candidate lookups.

use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use crate::models::CountyGeometry;

/// Wrapper for R-tree indexing of county geometries
#[derive(Clone)]
pub struct IndexedCounty {
    pub county: Arc<CountyGeometry>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedCounty {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedCounty {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope.distance_2(point)
    }
}

impl IndexedCounty {
    pub fn new(county: CountyGeometry) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = county.bbox()?;
        Some(Self {
            county: Arc::new(county),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Spatial index over county bounding boxes using an R-tree.
///
/// Bulk-loaded once from the validated geometry set and immutable
/// afterwards. The index answers candidacy, not containment; candidates
/// still need an exact test against the actual geometry.
pub struct CountySpatialIndex {
    tree: RTree<IndexedCounty>,
}

impl CountySpatialIndex {
    /// Build spatial index from validated county geometries
    pub fn build(counties: Vec<CountyGeometry>) -> Self {
        info!("Building spatial index for {} counties...", counties.len());

        let indexed: Vec<IndexedCounty> = counties
            .into_iter()
            .filter_map(IndexedCounty::new)
            .collect();
        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// Counties whose bounding box contains the point
    pub fn covering_candidates(&self, lon: f64, lat: f64) -> impl Iterator<Item = &IndexedCounty> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([lon, lat]))
    }

    /// Counties in ascending order of squared bounding-box distance to the
    /// point. The nearest entries start at distance zero when the point
    /// lies inside their box.
    pub fn nearest_candidates(
        &self,
        lon: f64,
        lat: f64,
    ) -> impl Iterator<Item = (&IndexedCounty, f64)> {
        self.tree.nearest_neighbor_iter_with_distance_2(&[lon, lat])
    }

    /// Get total number of indexed counties
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Iterate over all indexed counties
    pub fn counties(&self) -> impl Iterator<Item = &Arc<CountyGeometry>> {
        self.tree.iter().map(|ic| &ic.county)
    }
}
