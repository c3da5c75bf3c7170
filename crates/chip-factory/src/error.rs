//! Error types for chip factories.

use chip_common::ChipError;
use earth_engine::EarthEngineError;
use raster_io::RasterError;
use thiserror::Error;

/// Errors that can occur while running a chip factory.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// Locations, parameters or the resolved projection are unusable.
    #[error("invalid chip request: {0}")]
    InvalidRequest(#[from] ChipError),

    /// The image could not be resolved by the remote service.
    #[error("image {image} is not accessible: {source}")]
    ImageUnavailable {
        image: String,
        #[source]
        source: EarthEngineError,
    },

    /// The configured output has no writer.
    #[error("unsupported output: {0}")]
    UnsupportedOutput(#[source] RasterError),

    /// A remote call outside the per-chip loop failed.
    #[error("remote call failed: {0}")]
    Remote(#[from] EarthEngineError),

    /// Fetching the pixels for one chip failed.
    #[error("compute failed for {label}: {source}")]
    Compute {
        label: String,
        #[source]
        source: EarthEngineError,
    },

    /// Writing one chip failed.
    #[error("failed to write {label}: {source}")]
    Write {
        label: String,
        #[source]
        source: RasterError,
    },
}

impl FactoryError {
    /// Label of the chip that failed, for per-chip errors.
    pub fn chip_label(&self) -> Option<&str> {
        match self {
            Self::Compute { label, .. } | Self::Write { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// Result type for factory operations.
pub type Result<T> = std::result::Result<T, FactoryError>;
