//! The chip factory contract shared by every variant.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chip_common::{ChipError, Coordinate};
use chrono::{DateTime, Duration, Utc};
use earth_engine::ImageInfo;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::Result;
use crate::params::ChipParams;

/// Which imagery source a factory draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryVariant {
    /// Pixels computed on demand by a remote imagery service.
    #[serde(alias = "earth_engine")]
    RemoteCompute,
    /// A static catalog of pre-tiled imagery.
    #[serde(alias = "stac")]
    Catalog,
    /// Imagery on the local filesystem.
    Local,
}

impl FactoryVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteCompute => "remote_compute",
            Self::Catalog => "catalog",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for FactoryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactoryVariant {
    type Err = ChipError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "remote_compute" | "earth_engine" => Ok(Self::RemoteCompute),
            "catalog" | "stac" => Ok(Self::Catalog),
            "local" => Ok(Self::Local),
            _ => Err(ChipError::invalid_parameter(
                "variant",
                format!("unknown factory variant {:?}", s),
            )),
        }
    }
}

/// One chip handled by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenChip {
    pub label: String,
    pub coordinate: Coordinate,
    /// `None` when the writer produced no file.
    pub path: Option<PathBuf>,
    pub bytes: usize,
}

/// Summary of a `chip()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipReport {
    pub variant: FactoryVariant,
    pub image: String,
    /// Number of locations in the run.
    pub requested: usize,
    pub chips: Vec<WrittenChip>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ChipReport {
    /// Start a report for a run over `requested` locations.
    pub fn begin(variant: FactoryVariant, image: impl Into<String>, requested: usize) -> Self {
        let now = Utc::now();
        Self {
            variant,
            image: image.into(),
            requested,
            chips: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn push(&mut self, chip: WrittenChip) {
        self.chips.push(chip);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Chips that produced a file.
    pub fn files_written(&self) -> usize {
        self.chips.iter().filter(|c| c.path.is_some()).count()
    }

    pub fn total_bytes(&self) -> usize {
        self.chips.iter().map(|c| c.bytes).sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// A source of chips.
///
/// Every variant implements `chip()` itself; there is no shared driver.
#[async_trait]
pub trait ChipFactory: Send + Sync {
    fn variant(&self) -> FactoryVariant;

    fn run_config(&self) -> &RunConfig;

    /// Fail if any chip location is unusable.
    ///
    /// The collection shape is enforced when locations are deserialized;
    /// this checks the values.
    fn check_chip_locations(&self) -> Result<()> {
        self.run_config().locations().validate()?;
        Ok(())
    }

    /// Resolve the image, failing when it is not accessible.
    async fn check_image(&self) -> Result<ImageInfo>;

    /// Band ids of the image, in image order.
    async fn list_bands(&self) -> Result<Vec<String>>;

    /// Produce one chip per location.
    async fn chip(&self, params: &ChipParams) -> Result<ChipReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("remote_compute".parse::<FactoryVariant>().unwrap(), FactoryVariant::RemoteCompute);
        assert_eq!("Earth-Engine".parse::<FactoryVariant>().unwrap(), FactoryVariant::RemoteCompute);
        assert_eq!("stac".parse::<FactoryVariant>().unwrap(), FactoryVariant::Catalog);
        assert_eq!("local".parse::<FactoryVariant>().unwrap(), FactoryVariant::Local);
        assert!("zarr".parse::<FactoryVariant>().is_err());
    }

    #[test]
    fn test_report_counts() {
        let mut report = ChipReport::begin(FactoryVariant::RemoteCompute, "img", 2);
        report.push(WrittenChip {
            label: "chip_000".into(),
            coordinate: Coordinate::new(0.0, 0.0),
            path: Some(PathBuf::from("/out/chip_000.npy")),
            bytes: 100,
        });
        report.push(WrittenChip {
            label: "chip_001".into(),
            coordinate: Coordinate::new(1.0, 1.0),
            path: None,
            bytes: 0,
        });
        let report = report.finish();

        assert_eq!(report.files_written(), 1);
        assert_eq!(report.total_bytes(), 100);
        assert!(report.elapsed() >= Duration::zero());
    }
}
