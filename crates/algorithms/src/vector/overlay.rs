//! Polygon-set overlay
//!
//! Computes the boolean-set combination of two polygonal feature
//! collections and merges their attributes. Five modes are supported:
//! intersection, union, difference (erase), symmetric difference and
//! identity. Two engines implement them:
//!
//! - the clipping engine pairs features through the spatial index and
//!   clips each pair through the boolean kernel (the default), and
//! - the polygonization engine decomposes both inputs into boundary
//!   rings, rebuilds the atomic faces of their noded arrangement and
//!   classifies every face by containment — slower, but robust to inputs
//!   that defeat pairwise clipping.
//!
//! Both engines work on defensive copies: inputs are never mutated,
//! geometries are repaired up front, reference frames are aligned before
//! any geometric work, and the output is a fresh collection with 0-based
//! positional identity.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use geo::{BoundingRect, Geometry, InteriorPoint, Intersects, MultiPolygon, Point};
use stratagis_core::crs::transform_collection;
use stratagis_core::vector::{AttributeValue, Feature, FeatureCollection};
use stratagis_core::{Algorithm, Error, Result};
use tracing::{info, warn};

use crate::vector::attributes::merged_columns;
use crate::vector::clip;
use crate::vector::index::{candidate_pairs, SpatialIndex};
use crate::vector::noding::noded_arrangement;
use crate::vector::polygonize::polygonize;
use crate::vector::rings::extract_rings;
use crate::vector::spatial::{bounding_box, BoundingBox};

/// Boolean-set combination applied to the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    Intersection,
    Union,
    Difference,
    SymmetricDifference,
    Identity,
}

impl OverlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayMode::Intersection => "intersection",
            OverlayMode::Union => "union",
            OverlayMode::Difference => "difference",
            OverlayMode::SymmetricDifference => "symmetric_difference",
            OverlayMode::Identity => "identity",
        }
    }
}

impl fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "intersection" => Ok(OverlayMode::Intersection),
            "union" => Ok(OverlayMode::Union),
            "difference" => Ok(OverlayMode::Difference),
            "symmetric_difference" => Ok(OverlayMode::SymmetricDifference),
            "identity" => Ok(OverlayMode::Identity),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// Which engine executes the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayEngine {
    /// Spatial-index pairing + per-pair kernel clipping
    #[default]
    Clip,
    /// Ring extraction + noding + face reconstruction
    Polygonize,
}

/// Parameters for polygon overlay
#[derive(Debug, Clone)]
pub struct OverlayParams {
    /// Boolean-set combination to compute
    pub mode: OverlayMode,
    /// Reproject the second input to the first input's CRS when they differ
    pub reproject: bool,
    /// Use the spatial index for containment candidates in the
    /// polygonization engine (full scan otherwise)
    pub use_index: bool,
    /// Engine selection
    pub engine: OverlayEngine,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            mode: OverlayMode::Intersection,
            reproject: true,
            use_index: true,
            engine: OverlayEngine::Clip,
        }
    }
}

/// Overlay algorithm
#[derive(Debug, Clone, Default)]
pub struct Overlay;

impl Algorithm for Overlay {
    type Input = (FeatureCollection, FeatureCollection);
    type Output = FeatureCollection;
    type Params = OverlayParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Overlay"
    }

    fn description(&self) -> &'static str {
        "Combine two polygonal feature collections by boolean-set overlay and merge their attributes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        overlay_with(&input.0, &input.1, params)
    }
}

/// Perform spatial overlay between two polygonal feature collections.
///
/// Uses the default parameters: clipping engine, reprojection enabled.
///
/// # Arguments
/// * `a` - First feature collection
/// * `b` - Second feature collection
/// * `mode` - Boolean-set combination to compute
///
/// # Returns
/// A new feature collection with the combined geometries and merged
/// attributes, in A's CRS, with a fresh 0-based identity.
pub fn overlay(
    a: &FeatureCollection,
    b: &FeatureCollection,
    mode: OverlayMode,
) -> Result<FeatureCollection> {
    overlay_with(
        a,
        b,
        OverlayParams {
            mode,
            ..OverlayParams::default()
        },
    )
}

/// Perform spatial overlay with explicit parameters.
pub fn overlay_with(
    a: &FeatureCollection,
    b: &FeatureCollection,
    params: OverlayParams,
) -> Result<FeatureCollection> {
    let (a, b) = prepare(a, b, &params)?;
    match params.engine {
        OverlayEngine::Clip => clip_overlay(&a, &b, params.mode),
        OverlayEngine::Polygonize => polygonize_overlay(&a, &b, params.mode, params.use_index),
    }
}

/// Defensive copies: repair every geometry and align reference frames.
fn prepare(
    a: &FeatureCollection,
    b: &FeatureCollection,
    params: &OverlayParams,
) -> Result<(FeatureCollection, FeatureCollection)> {
    let mut a = a.clone();
    let mut b = b.clone();
    for feature in &mut a.features {
        feature.geometry = clip::repair_geometry(&feature.geometry);
    }
    for feature in &mut b.features {
        feature.geometry = clip::repair_geometry(&feature.geometry);
    }

    if !a.crs.is_equivalent(&b.crs) {
        if params.reproject {
            info!(from = %b.crs, to = %a.crs, "inputs use different reference frames, reprojecting second input");
            b = transform_collection(&b, &a.crs)?;
        } else {
            warn!(left = %a.crs, right = %b.crs, "inputs use different reference frames, proceeding without reprojection");
        }
    }
    Ok((a, b))
}

fn clip_overlay(
    a: &FeatureCollection,
    b: &FeatureCollection,
    mode: OverlayMode,
) -> Result<FeatureCollection> {
    match mode {
        OverlayMode::Intersection => intersection_of(a, b),
        OverlayMode::Difference => difference_of(a, b),
        OverlayMode::SymmetricDifference => symmetric_difference_of(a, b),
        OverlayMode::Union => union_of(a, b),
        OverlayMode::Identity => identity_of(a, b),
    }
}

/// Copy attributes from `feature` into `props`, renaming columns from the
/// source schema to the (possibly suffixed) target schema positionally.
fn project_properties(
    feature: &Feature,
    source: &[String],
    target: &[String],
    props: &mut HashMap<String, AttributeValue>,
) {
    for (src, dst) in source.iter().zip(target) {
        if let Some(value) = feature.get(src) {
            if !value.is_null() {
                props.insert(dst.clone(), value.clone());
            }
        }
    }
}

fn intersection_of(a: &FeatureCollection, b: &FeatureCollection) -> Result<FeatureCollection> {
    let merged = merged_columns(&a.columns, &b.columns);
    let a_cols = merged[..a.columns.len()].to_vec();
    let b_cols = merged[a.columns.len()..].to_vec();
    let mut out = FeatureCollection::with_columns(a.crs.clone(), merged);

    let index = SpatialIndex::build(&b.features);
    for pair in candidate_pairs(&a.features, &index) {
        let ga = clip::as_polygonal(&a.features[pair.a].geometry)?;
        let gb = clip::as_polygonal(&b.features[pair.b].geometry)?;
        let Some(geom) = clip::intersection(&ga, &gb) else {
            continue;
        };
        let mut feature = Feature::new(Geometry::MultiPolygon(geom));
        project_properties(&a.features[pair.a], &a.columns, &a_cols, &mut feature.properties);
        project_properties(&b.features[pair.b], &b.columns, &b_cols, &mut feature.properties);
        out.push(feature);
    }
    Ok(out)
}

fn difference_of(a: &FeatureCollection, b: &FeatureCollection) -> Result<FeatureCollection> {
    let mut out = FeatureCollection::with_columns(a.crs.clone(), a.columns.clone());
    let index = SpatialIndex::build(&b.features);

    for feature in &a.features {
        let Some(bb) = bounding_box(&feature.geometry) else {
            continue;
        };
        // Normalize before the no-hit shortcut; untouched features must
        // still be polygonal to be emitted
        let minuend = clip::as_polygonal(&feature.geometry)?;
        let hits = index.query(&bb);
        if hits.is_empty() {
            out.push(feature.clone());
            continue;
        }
        let subtrahends: Vec<MultiPolygon<f64>> = hits
            .iter()
            .map(|&i| clip::as_polygonal(&b.features[i].geometry))
            .collect::<Result<_>>()?;
        if let Some(geom) = clip::subtract(&minuend, &subtrahends) {
            let mut kept = feature.clone();
            kept.geometry = Geometry::MultiPolygon(geom);
            out.push(kept);
        }
    }
    Ok(out)
}

fn symmetric_difference_of(
    a: &FeatureCollection,
    b: &FeatureCollection,
) -> Result<FeatureCollection> {
    let merged = merged_columns(&a.columns, &b.columns);
    let a_cols = merged[..a.columns.len()].to_vec();
    let b_cols = merged[a.columns.len()..].to_vec();

    // Concatenate both sides under the merged schema; the absent side's
    // columns stay null on each row
    let mut combined: Vec<Feature> = Vec::with_capacity(a.len() + b.len());
    for feature in &a.features {
        let mut row = Feature::new(feature.geometry.clone());
        project_properties(feature, &a.columns, &a_cols, &mut row.properties);
        combined.push(row);
    }
    for feature in &b.features {
        let mut row = Feature::new(feature.geometry.clone());
        project_properties(feature, &b.columns, &b_cols, &mut row.properties);
        combined.push(row);
    }

    let index = SpatialIndex::build(&combined);
    let mut out = FeatureCollection::with_columns(a.crs.clone(), merged);

    for (i, feature) in combined.iter().enumerate() {
        let Some(bb) = bounding_box(&feature.geometry) else {
            continue;
        };
        let minuend = clip::as_polygonal(&feature.geometry)?;
        let hits: Vec<usize> = index.query(&bb).into_iter().filter(|&j| j != i).collect();
        if hits.is_empty() {
            out.push(feature.clone());
            continue;
        }
        let subtrahends: Vec<MultiPolygon<f64>> = hits
            .iter()
            .map(|&j| clip::as_polygonal(&combined[j].geometry))
            .collect::<Result<_>>()?;
        if let Some(geom) = clip::subtract(&minuend, &subtrahends) {
            let mut kept = feature.clone();
            kept.geometry = Geometry::MultiPolygon(geom);
            out.push(kept);
        }
    }
    Ok(out)
}

fn union_of(a: &FeatureCollection, b: &FeatureCollection) -> Result<FeatureCollection> {
    let mut out = intersection_of(a, b)?;
    let sym = symmetric_difference_of(a, b)?;
    debug_assert_eq!(out.columns, sym.columns);
    out.features.extend(sym.features);
    Ok(out)
}

fn identity_of(a: &FeatureCollection, b: &FeatureCollection) -> Result<FeatureCollection> {
    let mut out = union_of(a, b)?;
    // Keep only rows that carry A-side data; pure B-side remainders of the
    // symmetric difference have every A column null
    let a_side = out.columns[..a.columns.len()].to_vec();
    out.features
        .retain(|feature| a_side.iter().all(|col| !feature.is_null(col)));
    Ok(out)
}

fn polygonize_overlay(
    a: &FeatureCollection,
    b: &FeatureCollection,
    mode: OverlayMode,
    use_index: bool,
) -> Result<FeatureCollection> {
    let rings_a = extract_rings(&a.features)?;
    let rings_b = extract_rings(&b.features)?;
    let lines = noded_arrangement(&rings_a, &rings_b)?;
    let faces = polygonize(&lines);

    let merged = merged_columns(&a.columns, &b.columns);
    let a_cols = merged[..a.columns.len()].to_vec();
    let b_cols = merged[a.columns.len()..].to_vec();
    let mut out = FeatureCollection::with_columns(a.crs.clone(), merged);

    let a_index = use_index.then(|| SpatialIndex::build(&a.features));
    let b_index = use_index.then(|| SpatialIndex::build(&b.features));

    for face in faces {
        let Some(rp) = face.interior_point() else {
            continue;
        };
        let face_bb = face
            .bounding_rect()
            .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y));
        let hit_a = first_containing(&a.features, a_index.as_ref(), face_bb.as_ref(), &rp);
        let hit_b = first_containing(&b.features, b_index.as_ref(), face_bb.as_ref(), &rp);

        let keep = match mode {
            OverlayMode::Intersection => hit_a.is_some() && hit_b.is_some(),
            OverlayMode::Union => hit_a.is_some() || hit_b.is_some(),
            OverlayMode::Identity => hit_a.is_some(),
            OverlayMode::SymmetricDifference => hit_a.is_some() != hit_b.is_some(),
            OverlayMode::Difference => hit_a.is_some() && hit_b.is_none(),
        };
        if !keep {
            continue;
        }

        let mut feature = Feature::new(Geometry::Polygon(face));
        if let Some(i) = hit_a {
            project_properties(&a.features[i], &a.columns, &a_cols, &mut feature.properties);
        }
        if let Some(i) = hit_b {
            project_properties(&b.features[i], &b.columns, &b_cols, &mut feature.properties);
        }
        out.push(feature);
    }
    Ok(out)
}

/// First feature whose geometry contains the representative point.
///
/// Candidates come from the spatial index when available, else a full
/// scan; either way they are visited in ascending feature order, so the
/// first-match rule is at least deterministic when sources overlap.
fn first_containing(
    features: &[Feature],
    index: Option<&SpatialIndex>,
    face_bb: Option<&BoundingBox>,
    rp: &Point<f64>,
) -> Option<usize> {
    let candidates: Vec<usize> = match (index, face_bb) {
        (Some(index), Some(bb)) => index.query(bb),
        _ => (0..features.len()).collect(),
    };
    candidates
        .into_iter()
        .find(|&i| features[i].geometry.intersects(rp))
}
