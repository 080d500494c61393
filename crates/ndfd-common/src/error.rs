//! Error types for NDFD forecast retrieval and analysis.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using NdfdError.
pub type NdfdResult<T> = Result<T, NdfdError>;

/// Primary error type for forecast operations.
#[derive(Debug, Error)]
pub enum NdfdError {
    // === Query Errors ===
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Variable '{variable}' is not published for region '{region}'")]
    InvalidVariable { variable: String, region: String },

    #[error("Invalid neighborhood radius: {0} (must be >= 0)")]
    InvalidNeighborhood(i32),

    #[error("Invalid time step: {0} hours (must be >= 1)")]
    InvalidTimeStep(u32),

    #[error("Neighborhood of radius {radius} around ({x}, {y}) exceeds {nx}x{ny} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        radius: i64,
        nx: usize,
        ny: usize,
    },

    #[error("Region '{0}' has no elevation coverage")]
    UnsupportedRegion(String),

    // === Data Errors ===
    #[error("Failed to retrieve {}", path.display())]
    RetrievalFailure { path: PathBuf },

    #[error("Failed to decode grid: {0}")]
    Decode(String),

    #[error("Projection error: {0}")]
    Projection(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NdfdError {
    /// Whether the error was caused by the caller's arguments rather than
    /// by data retrieval or decoding.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            NdfdError::InvalidRegion(_)
                | NdfdError::InvalidVariable { .. }
                | NdfdError::InvalidNeighborhood(_)
                | NdfdError::InvalidTimeStep(_)
                | NdfdError::UnsupportedRegion(_)
        )
    }
}
