//! TopoJSON topology handling.
//!
//! Decodes the shared, delta-encoded arc table into absolute coordinates,
//! assembles arc references into polygon rings, and filters the result down
//! to valid, indexable county geometries.

mod decode;
mod document;
mod validate;

pub use decode::{decode_arc, decode_object, decode_ring, DecodeStats, DecodedFeature};
pub use document::{TopoGeometry, Topology, Transform};
pub use validate::{validate_features, ValidationStats};

use thiserror::Error;

/// Errors raised while decoding a topology.
///
/// An out-of-range arc reference is fatal only for the geometry that holds
/// it; a missing object aborts the run.
#[derive(Debug, Error)]
pub enum TopoError {
    #[error("arc index {index} out of bounds (arc table has {len} entries)")]
    ArcIndexOutOfBounds { index: usize, len: usize },

    #[error("topology has no object named {0:?}")]
    MissingObject(String),
}
