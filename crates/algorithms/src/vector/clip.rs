//! Kernel-backed clipping with repair
//!
//! All clipping is `MultiPolygon`-normalized. Every kernel result is passed
//! through [`repair`] before use, and sequential subtraction repairs after
//! every step so floating-point drift never compounds. An empty result is a
//! dropped feature, never an error.

use geo::{BooleanOps, Geometry, MultiPolygon, Validation};
use stratagis_core::vector::geometry_type_name;
use stratagis_core::{Error, Result};

/// Normalize a geometry to a multipolygon, or fail with a type error.
pub fn as_polygonal(geom: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        other => Err(Error::UnsupportedGeometryType {
            found: geometry_type_name(other),
        }),
    }
}

/// Fix an invalid multipolygon by re-resolving it through the boolean
/// kernel (union with the empty multipolygon), which renodes rings and
/// removes self-intersections. Valid input is returned unchanged.
pub fn repair(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if mp.is_valid() {
        mp.clone()
    } else {
        mp.union(&MultiPolygon::new(Vec::new()))
    }
}

/// Repair a feature geometry in place of the zero-width-buffer fix.
///
/// Non-polygonal geometries pass through untouched; the polygon-only
/// kernel operations downstream raise their own type errors.
pub fn repair_geometry(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Polygon(p) => {
            let mut mp = repair(&MultiPolygon::new(vec![p.clone()]));
            if mp.0.len() == 1 {
                Geometry::Polygon(mp.0.remove(0))
            } else {
                Geometry::MultiPolygon(mp)
            }
        }
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(repair(mp)),
        other => other.clone(),
    }
}

/// Repaired intersection of two multipolygons.
///
/// `None` means the geometries do not truly intersect; the caller drops
/// the pair.
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    non_empty(repair(&a.intersection(b)))
}

/// Subtract a sequence of multipolygons from a minuend, repairing after
/// every step. Early-exits once the running result is empty.
pub fn subtract<'a, I>(minuend: &MultiPolygon<f64>, subtrahends: I) -> Option<MultiPolygon<f64>>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    let mut current = repair(minuend);
    for other in subtrahends {
        if current.0.is_empty() {
            return None;
        }
        current = repair(&current.difference(other));
    }
    non_empty(current)
}

fn non_empty(mp: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    if mp.0.is_empty() {
        None
    } else {
        Some(mp)
    }
}
