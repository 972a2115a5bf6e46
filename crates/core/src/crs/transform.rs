//! Pure-Rust WGS84 ↔ Web Mercator reprojection (spherical formulas).
//!
//! Covers EPSG:4326 and EPSG:3857, the pair used throughout the vector
//! pipeline. No external C dependencies (no libproj), so it works on WASM
//! targets. Any other CRS pair is rejected with [`Error::CrsMismatch`].

use geo::MapCoords;
use geo_types::{Coord, Geometry};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::FeatureCollection;

/// WGS84 spherical radius used by Web Mercator (m)
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Forward projection: longitude/latitude degrees to Web Mercator meters.
pub fn wgs84_to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let x = EARTH_RADIUS * c.x.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + c.y.to_radians() / 2.0).tan().ln();
    Coord { x, y }
}

/// Inverse projection: Web Mercator meters to longitude/latitude degrees.
pub fn web_mercator_to_wgs84(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (c.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Coord { x: lon, y: lat }
}

/// Pick the coordinate mapping for a CRS pair, if supported.
fn point_transform(from: &CRS, to: &CRS) -> Result<fn(Coord<f64>) -> Coord<f64>> {
    match (from.epsg(), to.epsg()) {
        (Some(4326), Some(3857)) => Ok(wgs84_to_web_mercator),
        (Some(3857), Some(4326)) => Ok(web_mercator_to_wgs84),
        _ => Err(Error::CrsMismatch(from.identifier(), to.identifier())),
    }
}

/// Reproject a geometry from one CRS to another.
///
/// Returns the geometry unchanged when the CRS are already equivalent.
pub fn transform_geometry(geom: &Geometry<f64>, from: &CRS, to: &CRS) -> Result<Geometry<f64>> {
    if from.is_equivalent(to) {
        return Ok(geom.clone());
    }
    let map = point_transform(from, to)?;
    Ok(geom.map_coords(map))
}

/// Rebuild a feature collection in the target CRS.
///
/// Attributes and feature order are preserved; only coordinates change.
pub fn transform_collection(collection: &FeatureCollection, to: &CRS) -> Result<FeatureCollection> {
    let mut out = collection.clone();
    for feature in &mut out.features {
        feature.geometry = transform_geometry(&feature.geometry, &collection.crs, to)?;
    }
    out.crs = to.clone();
    Ok(out)
}
