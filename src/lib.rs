//! Mortar - county assignment engine for pharmacy density mapping
//!
//! Decodes a TopoJSON county topology into polygons, builds an R-tree
//! spatial index over them, resolves each pharmacy point to its county
//! and aggregates a per-county status histogram.

pub mod density;
pub mod fetch;
pub mod models;
pub mod pip;
pub mod topo;

pub use models::{CountyGeometry, Fips, PharmacyPoint, PharmacyStatus};
