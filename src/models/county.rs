//! County identity and geometry types.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Five-digit county FIPS code, left-zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fips(String);

impl Fips {
    /// Normalize a raw feature identifier into a five-character FIPS code.
    pub fn normalize(raw: &str) -> Self {
        Self(format!("{:0>5}", raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fips {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single county geometry with its identifier.
///
/// Polygons are stored as single-member MultiPolygons so the index and
/// resolver only deal with one geometry kind.
#[derive(Debug, Clone)]
pub struct CountyGeometry {
    pub fips: Fips,
    pub geometry: MultiPolygon<f64>,
}

impl CountyGeometry {
    /// Get the bounding box of this county
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        use geo::BoundingRect;
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}
