//! Job file loading.
//!
//! A job file names the factory to build, the locations to chip and the
//! chipping parameters:
//!
//! ```yaml
//! factory:
//!   variant: remote_compute
//!   image: projects/my-project/assets/rgb
//!   output_location: /data/chips
//!   output_format: NPY
//!   cloud_project: my-project
//! locations:
//!   - [-16.70, 13.37]
//! chip:
//!   bands: [b1, b2, b3]
//!   scale: 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chip_common::{ChipLocations, OutputFormat};
use chip_factory::{ChipParams, FactoryVariant, RunConfig};
use serde::Deserialize;
use tracing::info;

/// Root of a job file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChipJobConfig {
    pub factory: FactoryConfig,
    pub locations: ChipLocations,
    pub chip: ChipParams,
}

/// Which factory to build and where its output goes.
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryConfig {
    #[serde(default = "default_variant")]
    pub variant: FactoryVariant,
    pub image: String,
    pub output_location: PathBuf,
    pub output_format: OutputFormat,
    /// Cloud project for remote compute; falls back to `EE_PROJECT`.
    #[serde(default)]
    pub cloud_project: Option<String>,
}

fn default_variant() -> FactoryVariant {
    FactoryVariant::RemoteCompute
}

impl ChipJobConfig {
    /// Load and validate a job file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid job file {}", path.display()))?;

        info!(
            path = %path.display(),
            variant = %config.factory.variant,
            image = %config.factory.image,
            locations = config.locations.len(),
            format = %config.factory.output_format,
            "Loaded job file"
        );
        Ok(config)
    }

    /// Parse and validate job YAML.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse job YAML")?;
        config.run_config(None).validate()?;
        config.chip.validate()?;
        Ok(config)
    }

    /// Run configuration, with an optional output location override.
    pub fn run_config(&self, output_override: Option<&Path>) -> RunConfig {
        let output = output_override.unwrap_or(self.factory.output_location.as_path());
        RunConfig::new(
            self.factory.image.clone(),
            self.locations.clone(),
            output,
            self.factory.output_format,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip_common::Coordinate;
    use chip_factory::ChipAnchor;

    #[test]
    fn test_parse_bundled_gambia_job() {
        let config = ChipJobConfig::parse(include_str!("../config/gambia.yaml")).unwrap();

        assert_eq!(config.factory.variant, FactoryVariant::RemoteCompute);
        assert_eq!(config.factory.output_format, OutputFormat::GeoTiff);
        assert_eq!(
            config.factory.cloud_project.as_deref(),
            Some("pc511-gambia-training")
        );
        assert_eq!(config.locations.len(), 2);
        let (label, first) = config.locations.labeled().next().unwrap();
        assert_eq!(label, "chip_000");
        assert_eq!(first, Coordinate::new(-16.7021, 13.3686));
        assert_eq!(config.chip.bands, vec!["b1", "b2", "b3"]);
        assert_eq!(config.chip.scale, 1.0);
        assert_eq!(config.chip.workload_tag, "test-chipfactory-ee");
    }

    #[test]
    fn test_parse_minimal_job_uses_defaults() {
        let yaml = r#"
factory:
  image: GOOGLE/DYNAMICWORLD/V1/20220108T160639_20220108T160732_T17SQB
  output_location: /tmp/chips
  output_format: NPY
locations:
  - [-81.2, 35.1]
chip:
  scale: 10
"#;
        let config = ChipJobConfig::parse(yaml).unwrap();
        assert_eq!(config.factory.variant, FactoryVariant::RemoteCompute);
        assert_eq!(config.factory.cloud_project, None);
        assert!(config.chip.bands.is_empty());
        assert_eq!(config.chip.crs, "EPSG:4326");
        assert_eq!((config.chip.chip_x, config.chip.chip_y), (256, 256));
        assert_eq!(config.chip.anchor, ChipAnchor::UpperLeft);
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let yaml = r#"
factory:
  image: img
  output_location: /tmp/chips
  output_format: ZARR
locations: [[0.0, 0.0]]
chip:
  scale: 10
"#;
        assert!(ChipJobConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_flat_location_pair_rejected() {
        let yaml = r#"
factory:
  image: img
  output_location: /tmp/chips
  output_format: NPY
locations: [-16.70, 13.37]
chip:
  scale: 10
"#;
        assert!(ChipJobConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_bad_chip_params_rejected() {
        let yaml = r#"
factory:
  image: img
  output_location: /tmp/chips
  output_format: NPY
locations: [[0.0, 0.0]]
chip:
  scale: 0
"#;
        assert!(ChipJobConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_output_override() {
        let config = ChipJobConfig::parse(include_str!("../config/gambia.yaml")).unwrap();
        let run = config.run_config(Some(Path::new("/tmp/override")));
        assert_eq!(run.output_location(), Path::new("/tmp/override"));
        assert_eq!(
            config.run_config(None).output_location(),
            Path::new("/data/chips/gambia")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(&path, include_str!("../config/gambia.yaml")).unwrap();

        let config = ChipJobConfig::load(&path).unwrap();
        assert_eq!(config.locations.len(), 2);

        assert!(ChipJobConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
