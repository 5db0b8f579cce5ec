use thiserror::Error;

/// Errors originating from the core viewport model.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius squared: {0} (must be > 0.0)")]
    InvalidRadiusSquared(f64),

    #[error("invalid bounds: {reason}")]
    InvalidBounds { reason: String },

    #[error("invalid magnification: {0} (must be positive and finite)")]
    InvalidMagnification(f64),

    #[error("invalid grid dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("escape time {value} exceeds iteration cap {max}")]
    CellOutOfRange { value: u32, max: u32 },

    #[error("unknown color theme: {0:?}")]
    UnknownTheme(String),
}
