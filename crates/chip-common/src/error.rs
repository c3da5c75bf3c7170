//! Error types for chip configuration.

use thiserror::Error;

/// Result type alias using ChipError.
pub type ChipResult<T> = Result<T, ChipError>;

/// Errors raised while validating chip run configuration.
#[derive(Debug, Error)]
pub enum ChipError {
    #[error("Invalid chip location at index {index}: {reason}")]
    InvalidLocation { index: usize, reason: String },

    #[error("Unknown output format: {0}")]
    UnknownOutputFormat(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),
}

impl ChipError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
