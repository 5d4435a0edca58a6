//! Error types for the analytics engine.
//!
//! Empty input collections are valid everywhere and produce empty results;
//! errors exist only for caller contract violations such as a zero cluster
//! count or a non-positive radius.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised for invalid caller-supplied parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Requested cluster count cannot be satisfied.
    #[error("invalid cluster count {requested}: dataset has {available} usable points")]
    InvalidClusterCount { requested: usize, available: usize },

    /// Bounding box is inverted or non-finite.
    #[error(
        "invalid bounding box: north={north}, south={south}, east={east}, west={west}"
    )]
    InvalidBounds {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },

    /// Grid spacing must be a positive number of kilometers.
    #[error("grid spacing must be positive, got {0} km")]
    InvalidGridSpacing(f64),

    /// Search radius must be a positive number of kilometers.
    #[error("search radius must be positive, got {0} km")]
    InvalidRadius(f64),
}
