//! Error types for the scalar raster crates.
//!
//! Sampling and rendering never fail: they fall back to NaN, an invalid
//! interval, an empty image or an empty contour map. Errors are reserved for
//! loading and checking configuration.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Primary error type for raster operations.
#[derive(Debug, Error)]
pub enum RasterError {
    // === Configuration Errors ===
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl RasterError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by caller-provided input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RasterError::InvalidColor(_) | RasterError::InvalidConfig { .. } | RasterError::Json(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for RasterError {
    fn from(err: std::io::Error) -> Self {
        RasterError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RasterError {
    fn from(err: serde_json::Error) -> Self {
        RasterError::Json(err.to_string())
    }
}
