//! Boundary ring extraction
//!
//! Decomposes every (multi)polygon feature into a flat collection of
//! exterior and interior rings, repairing invalid geometry first. This is
//! the entry step of the polygonization overlay engine.

use geo::LineString;
use stratagis_core::vector::Feature;
use stratagis_core::Result;

use crate::vector::clip;

/// Collect every exterior and interior ring from a set of polygonal
/// features, in feature order.
///
/// Invalid polygons are repaired before decomposition. Any non-polygonal
/// geometry fails immediately with a type error naming the offending class.
pub fn extract_rings(features: &[Feature]) -> Result<Vec<LineString<f64>>> {
    let mut rings = Vec::new();
    for feature in features {
        let mp = clip::repair(&clip::as_polygonal(&feature.geometry)?);
        for polygon in &mp.0 {
            rings.push(polygon.exterior().clone());
            rings.extend(polygon.interiors().iter().cloned());
        }
    }
    Ok(rings)
}
