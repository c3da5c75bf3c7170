//! Per-call chipping parameters.

use chip_common::{ChipError, ChipResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CRS: &str = "EPSG:4326";
pub const DEFAULT_CHIP_SIZE: u32 = 256;
pub const DEFAULT_WORKLOAD_TAG: &str = "test";
pub const DEFAULT_REQUEST_LIMIT: u32 = 20;

/// Where the chip sits relative to its coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipAnchor {
    /// The coordinate is the chip's upper-left corner.
    #[default]
    UpperLeft,
    /// The coordinate is the chip's center.
    Center,
}

/// Parameters for one `chip()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipParams {
    /// Band ids to request; empty requests every band.
    #[serde(default)]
    pub bands: Vec<String>,

    /// Nominal pixel size in meters.
    pub scale: f64,

    #[serde(default = "default_crs")]
    pub crs: String,

    /// Chip width in pixels.
    #[serde(default = "default_chip_size")]
    pub chip_x: u32,

    /// Chip height in pixels.
    #[serde(default = "default_chip_size")]
    pub chip_y: u32,

    #[serde(default = "default_workload_tag")]
    pub workload_tag: String,

    /// Carried with the settings and logged; requests are sequential.
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    #[serde(default)]
    pub anchor: ChipAnchor,
}

fn default_crs() -> String {
    DEFAULT_CRS.to_string()
}

fn default_chip_size() -> u32 {
    DEFAULT_CHIP_SIZE
}

fn default_workload_tag() -> String {
    DEFAULT_WORKLOAD_TAG.to_string()
}

fn default_request_limit() -> u32 {
    DEFAULT_REQUEST_LIMIT
}

impl ChipParams {
    /// Parameters with every optional field at its default.
    pub fn new<I, S>(bands: I, scale: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bands: bands.into_iter().map(Into::into).collect(),
            scale,
            crs: default_crs(),
            chip_x: DEFAULT_CHIP_SIZE,
            chip_y: DEFAULT_CHIP_SIZE,
            workload_tag: default_workload_tag(),
            request_limit: DEFAULT_REQUEST_LIMIT,
            anchor: ChipAnchor::default(),
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = crs.into();
        self
    }

    pub fn with_chip_size(mut self, chip_x: u32, chip_y: u32) -> Self {
        self.chip_x = chip_x;
        self.chip_y = chip_y;
        self
    }

    pub fn with_workload_tag(mut self, tag: impl Into<String>) -> Self {
        self.workload_tag = tag.into();
        self
    }

    pub fn with_anchor(mut self, anchor: ChipAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Minimal sanity checks before anything is sent.
    pub fn validate(&self) -> ChipResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ChipError::invalid_parameter(
                "scale",
                format!("must be a positive number, got {}", self.scale),
            ));
        }
        if self.chip_x == 0 {
            return Err(ChipError::invalid_parameter("chip_x", "must be > 0"));
        }
        if self.chip_y == 0 {
            return Err(ChipError::invalid_parameter("chip_y", "must be > 0"));
        }
        if self.crs.trim().is_empty() {
            return Err(ChipError::invalid_parameter("crs", "must not be empty"));
        }
        Ok(())
    }
}
