//! Error types for Earth Engine access.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to Earth Engine.
#[derive(Error, Debug)]
pub enum EarthEngineError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Earth Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration is incomplete or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EarthEngineError {
    /// Create an InvalidResponse error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an Api error from a failed response body.
    ///
    /// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`;
    /// anything else is reported verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => match error.status {
                Some(code) => format!("{}: {}", code, error.message),
                None => error.message,
            },
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::Api { status, message }
    }

    /// HTTP status code for Api errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Result type for Earth Engine operations.
pub type EarthEngineResult<T> = std::result::Result<T, EarthEngineError>;
