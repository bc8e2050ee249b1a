//! Serde model of a TopoJSON topology document.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A parsed topology document.
///
/// The `arcs` table is required; a document without one fails to parse and
/// aborts the run. Arc entries are coordinate deltas when a transform is
/// present, absolute pairs otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    pub arcs: Vec<Vec<[f64; 2]>>,

    #[serde(default)]
    pub transform: Option<Transform>,

    pub objects: HashMap<String, TopoObject>,
}

/// Linear transform recovering real-world coordinates from quantized deltas
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    /// Map a cumulative delta sum to real-world coordinates
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

/// A named geometry collection within the topology
#[derive(Debug, Clone, Deserialize)]
pub struct TopoObject {
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

/// One geometry entry referencing arcs by index.
///
/// Only Polygon and MultiPolygon are assembled; every other type falls into
/// `Other` and is counted as skipped. Feature ids appear as strings or
/// numbers depending on the producer, so they are kept as raw JSON values
/// until validation normalizes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    Polygon {
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
        #[serde(default)]
        arcs: Vec<Vec<i32>>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
        #[serde(default)]
        arcs: Vec<Vec<Vec<i32>>>,
    },
    #[serde(other)]
    Other,
}
