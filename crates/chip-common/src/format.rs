//! Output formats a chip run can be configured with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChipError;

/// Output format for chips.
///
/// The wire names match the remote service's `fileFormat` values, so the
/// same string is used in job files and in compute requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    /// Encoded GeoTIFF, written as `.tif`
    GeoTiff,
    /// NumPy `.npy` array file
    Npy,
    /// TFRecord image (accepted, not written)
    TfRecordImage,
    /// In-memory NumPy array; has no file writer
    NumpyNdarray,
}

impl OutputFormat {
    /// All formats accepted in configuration.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::GeoTiff,
        OutputFormat::Npy,
        OutputFormat::TfRecordImage,
        OutputFormat::NumpyNdarray,
    ];

    /// Name used on the wire and in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeoTiff => "GEO_TIFF",
            Self::Npy => "NPY",
            Self::TfRecordImage => "TF_RECORD_IMAGE",
            Self::NumpyNdarray => "NUMPY_NDARRAY",
        }
    }

    /// File extension for formats that produce a file.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::GeoTiff => Some("tif"),
            Self::Npy | Self::NumpyNdarray => Some("npy"),
            Self::TfRecordImage => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ChipError;

    /// Parse a format name (case-insensitive, `-` accepted for `_`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        match normalized.as_str() {
            "GEO_TIFF" | "GEOTIFF" => Ok(Self::GeoTiff),
            "NPY" => Ok(Self::Npy),
            "TF_RECORD_IMAGE" => Ok(Self::TfRecordImage),
            "NUMPY_NDARRAY" => Ok(Self::NumpyNdarray),
            _ => Err(ChipError::UnknownOutputFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
