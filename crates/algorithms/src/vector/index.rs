//! R-tree spatial index over feature bounding boxes
//!
//! Built at most once per input per overlay call; immutable after build.
//! Queries return feature indices in ascending order so downstream
//! iteration is deterministic.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use stratagis_core::vector::Feature;

use crate::vector::spatial::{bounding_box, BoundingBox};

/// A pair of feature indices whose bounding boxes intersect.
///
/// Bounding-box intersection is necessary but not sufficient for true
/// geometric intersection; callers still have to clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    /// Index into the first feature set
    pub a: usize,
    /// Index into the second feature set
    pub b: usize,
}

type IndexEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Bounding-box index over one feature set.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
}

impl SpatialIndex {
    /// Bulk-load an index over each feature's bounding box.
    ///
    /// Features with empty geometry have no box and are not indexed.
    pub fn build(features: &[Feature]) -> Self {
        let entries: Vec<IndexEntry> = features
            .iter()
            .enumerate()
            .filter_map(|(i, feature)| {
                bounding_box(&feature.geometry).map(|bb| {
                    GeomWithData::new(
                        Rectangle::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y]),
                        i,
                    )
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of features whose bounding box intersects the query box,
    /// sorted ascending. Touching boxes count as intersecting.
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let envelope = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Enumerate candidate pairs between a feature set and an indexed set.
///
/// Pairs are emitted by the first set's original order, then by the second
/// set's index order within each feature.
pub fn candidate_pairs(features: &[Feature], index: &SpatialIndex) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for (a, feature) in features.iter().enumerate() {
        let Some(bb) = bounding_box(&feature.geometry) else {
            continue;
        };
        for b in index.query(&bb) {
            pairs.push(CandidatePair { a, b });
        }
    }
    pairs
}
