//! Error types for chip encoding and writing.

use chip_common::OutputFormat;
use thiserror::Error;

/// Errors that can occur while encoding, decoding or writing chips.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Filesystem error while writing a chip.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed NPY header or body.
    #[error("invalid NPY data: {0}")]
    Npy(String),

    /// TIFF container could not be read or written.
    #[error("TIFF error: {0}")]
    Tiff(String),

    /// Sample count does not match the declared shape.
    #[error("shape {shape:?} does not match {len} samples")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    /// Array layout cannot be written as a raster.
    #[error("invalid raster layout: {0}")]
    InvalidLayout(String),

    /// Sample type not handled by the codec.
    #[error("unsupported data type: {0}")]
    UnsupportedDtype(String),

    /// No writer exists for this output format.
    #[error("no writer for output format {0}")]
    UnsupportedFormat(OutputFormat),
}

impl RasterError {
    /// Create an Npy error.
    pub fn npy(msg: impl Into<String>) -> Self {
        Self::Npy(msg.into())
    }

    /// Create an InvalidLayout error.
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }
}

impl From<tiff::TiffError> for RasterError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Tiff(err.to_string())
    }
}

/// Result type for raster operations.
pub type RasterResult<T> = std::result::Result<T, RasterError>;
