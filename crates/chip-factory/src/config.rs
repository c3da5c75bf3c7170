//! Run configuration shared by every factory variant.

use std::path::{Path, PathBuf};

use chip_common::{ChipError, ChipLocations, ChipResult, OutputFormat};

/// What to chip and where to put it.
///
/// Fixed at construction; there is no way to change the output format of
/// an existing factory.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    image: String,
    locations: ChipLocations,
    output_location: PathBuf,
    output_format: OutputFormat,
}

impl RunConfig {
    pub fn new(
        image: impl Into<String>,
        locations: impl Into<ChipLocations>,
        output_location: impl Into<PathBuf>,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            image: image.into(),
            locations: locations.into(),
            output_location: output_location.into(),
            output_format,
        }
    }

    /// Image identifier understood by the imagery source.
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn locations(&self) -> &ChipLocations {
        &self.locations
    }

    /// Directory (or object-store URI) chips are written to.
    pub fn output_location(&self) -> &Path {
        &self.output_location
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Check the fields that can be checked without the remote service.
    pub fn validate(&self) -> ChipResult<()> {
        if self.image.trim().is_empty() {
            return Err(ChipError::invalid_parameter("image", "must not be empty"));
        }
        if self.output_location.as_os_str().is_empty() {
            return Err(ChipError::invalid_parameter(
                "output_location",
                "must not be empty",
            ));
        }
        self.locations.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let ok = RunConfig::new("img", vec![(1.0, 2.0)], "/tmp/chips", OutputFormat::Npy);
        assert!(ok.validate().is_ok());

        let no_image = RunConfig::new(" ", vec![(1.0, 2.0)], "/tmp/chips", OutputFormat::Npy);
        assert!(no_image.validate().is_err());

        let no_output = RunConfig::new("img", vec![(1.0, 2.0)], "", OutputFormat::Npy);
        assert!(no_output.validate().is_err());

        let bad_location =
            RunConfig::new("img", vec![(f64::NAN, 2.0)], "/tmp/chips", OutputFormat::Npy);
        assert!(matches!(
            bad_location.validate(),
            Err(ChipError::InvalidLocation { index: 0, .. })
        ));
    }
}
