//! Vector analysis algorithms
//!
//! Polygon-set overlay and its supporting machinery:
//! - Bounding boxes and the R-tree spatial index
//! - Candidate pair enumeration
//! - Kernel-backed clipping with repair
//! - Attribute schema merging with deterministic collision suffixing
//! - Ring extraction, noding and polygonization (the robust overlay engine)

mod attributes;
mod clip;
mod index;
mod noding;
mod overlay;
mod polygonize;
mod rings;
mod spatial;

pub use attributes::{merged_columns, uniquify};
pub use clip::{as_polygonal, intersection, repair, repair_geometry, subtract};
pub use index::{candidate_pairs, CandidatePair, SpatialIndex};
pub use noding::noded_arrangement;
pub use overlay::{overlay, overlay_with, Overlay, OverlayEngine, OverlayMode, OverlayParams};
pub use polygonize::polygonize;
pub use rings::extract_rings;
pub use spatial::{bounding_box, BoundingBox};
