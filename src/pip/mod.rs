//! Point-in-Polygon (PIP) county assignment.
//!
//! Builds an R-tree spatial index over county bounding boxes and resolves
//! points to counties with exact containment plus a near-boundary fallback.

mod index;
mod resolver;

pub use index::{CountySpatialIndex, IndexedCounty};
pub use resolver::{AssignmentResolver, DEFAULT_TOLERANCE};
