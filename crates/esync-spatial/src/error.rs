//! Spatial index error types.

use thiserror::Error;

/// Spatial index error type.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Cell size must be positive and finite.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f32),

    /// World bounds must be positive and finite on both axes.
    #[error("invalid world bounds: {0}x{1}")]
    InvalidWorldBounds(f32, f32),

    /// The partition does not support this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Result type for spatial index operations.
pub type SpatialResult<T> = Result<T, SpatialError>;
