//! # StrataGIS Algorithms
//!
//! Geospatial analysis algorithms for StrataGIS.
//!
//! ## Available Algorithm Categories
//!
//! - **vector**: polygon-set overlay (intersection, union, difference,
//!   symmetric difference, identity), spatial indexing, clipping,
//!   ring extraction and polygonization

pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::vector::{
        bounding_box, candidate_pairs, overlay, overlay_with, uniquify, BoundingBox,
        CandidatePair, Overlay, OverlayEngine, OverlayMode, OverlayParams, SpatialIndex,
    };
    pub use stratagis_core::prelude::*;
}
