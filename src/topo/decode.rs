//! Arc decoding and feature assembly.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::debug;

use super::document::{TopoGeometry, Topology};
use super::TopoError;

/// A decoded feature, not yet validated.
#[derive(Debug, Clone)]
pub struct DecodedFeature {
    pub id: Option<Value>,
    pub geometry: MultiPolygon<f64>,
}

/// Counters describing how the geometry set was whittled down during decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeStats {
    pub decoded: usize,
    /// Geometry types other than Polygon/MultiPolygon
    pub skipped_type: usize,
    /// Geometries holding an out-of-range arc reference
    pub skipped_decode: usize,
}

/// Decode one arc reference into absolute coordinates.
///
/// A negative reference is the ones' complement of the table index and the
/// arc is traversed end-to-start.
pub fn decode_arc(topo: &Topology, arc_ref: i32) -> Result<Vec<Coord<f64>>, TopoError> {
    let reversed = arc_ref < 0;
    let index = if reversed { !arc_ref as usize } else { arc_ref as usize };

    let deltas = topo
        .arcs
        .get(index)
        .ok_or(TopoError::ArcIndexOutOfBounds {
            index,
            len: topo.arcs.len(),
        })?;

    let mut coords = Vec::with_capacity(deltas.len());
    match &topo.transform {
        Some(transform) => {
            let (mut x, mut y) = (0.0, 0.0);
            for &[dx, dy] in deltas {
                x += dx;
                y += dy;
                let (lon, lat) = transform.apply(x, y);
                coords.push(Coord { x: lon, y: lat });
            }
        }
        None => coords.extend(deltas.iter().map(|&[x, y]| Coord { x, y })),
    }

    if reversed {
        coords.reverse();
    }
    Ok(coords)
}

/// Stitch a sequence of arc references into one ring.
///
/// Each arc after the first begins on the previous arc's final coordinate;
/// the duplicate is dropped while concatenating.
pub fn decode_ring(topo: &Topology, arc_refs: &[i32]) -> Result<Vec<Coord<f64>>, TopoError> {
    let mut ring: Vec<Coord<f64>> = Vec::new();
    for &arc_ref in arc_refs {
        let coords = decode_arc(topo, arc_ref)?;
        if ring.is_empty() {
            ring = coords;
        } else {
            ring.extend(coords.into_iter().skip(1));
        }
    }
    Ok(ring)
}

fn assemble_polygon(topo: &Topology, rings: &[Vec<i32>]) -> Result<Polygon<f64>, TopoError> {
    let Some((outer, holes)) = rings.split_first() else {
        return Ok(Polygon::new(LineString::new(vec![]), vec![]));
    };

    let exterior = LineString::new(decode_ring(topo, outer)?);
    let mut interiors = Vec::with_capacity(holes.len());
    for hole in holes {
        interiors.push(LineString::new(decode_ring(topo, hole)?));
    }
    Ok(Polygon::new(exterior, interiors))
}

/// Decode every Polygon/MultiPolygon in a named geometry collection.
///
/// A bad arc reference skips the geometry holding it, not the run;
/// a missing object aborts.
pub fn decode_object(
    topo: &Topology,
    name: &str,
) -> Result<(Vec<DecodedFeature>, DecodeStats), TopoError> {
    let object = topo
        .objects
        .get(name)
        .ok_or_else(|| TopoError::MissingObject(name.to_string()))?;

    let mut features = Vec::with_capacity(object.geometries.len());
    let mut stats = DecodeStats::default();

    for geometry in &object.geometries {
        match geometry {
            TopoGeometry::Polygon { id, arcs, .. } => match assemble_polygon(topo, arcs) {
                Ok(polygon) => {
                    features.push(DecodedFeature {
                        id: id.clone(),
                        geometry: MultiPolygon::new(vec![polygon]),
                    });
                    stats.decoded += 1;
                }
                Err(e) => {
                    debug!("Skipping polygon {:?}: {}", id, e);
                    stats.skipped_decode += 1;
                }
            },
            TopoGeometry::MultiPolygon { id, arcs, .. } => {
                let polygons: Result<Vec<Polygon<f64>>, TopoError> = arcs
                    .iter()
                    .map(|rings| assemble_polygon(topo, rings))
                    .collect();
                match polygons {
                    Ok(polygons) => {
                        features.push(DecodedFeature {
                            id: id.clone(),
                            geometry: MultiPolygon::new(polygons),
                        });
                        stats.decoded += 1;
                    }
                    Err(e) => {
                        debug!("Skipping multipolygon {:?}: {}", id, e);
                        stats.skipped_decode += 1;
                    }
                }
            }
            TopoGeometry::Other => stats.skipped_type += 1,
        }
    }

    Ok((features, stats))
}
