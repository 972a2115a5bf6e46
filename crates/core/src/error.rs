//! Error types for StrataGIS

use thiserror::Error;

/// Main error type for StrataGIS operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid overlay mode \"{0}\": expected one of intersection, union, identity, symmetric_difference, difference")]
    InvalidMode(String),

    #[error("overlay only takes feature collections with (multi)polygon geometries, found {found}")]
    UnsupportedGeometryType { found: &'static str },

    #[error("geometry kernel failure: {0}")]
    GeometryKernel(String),

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),
}

/// Result type alias for StrataGIS operations
pub type Result<T> = std::result::Result<T, Error>;
