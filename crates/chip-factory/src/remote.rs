//! Chip factory backed by a remote imagery compute service.

use async_trait::async_trait;
use earth_engine::{EarthEngineError, ImageInfo, ImageryBoundary};
use raster_io::{ChipPayload, ChipWriter};
use tracing::{debug, info, instrument, warn};

use crate::config::RunConfig;
use crate::error::{FactoryError, Result};
use crate::factory::{ChipFactory, ChipReport, FactoryVariant, WrittenChip};
use crate::metrics;
use crate::params::ChipParams;
use crate::settings::FactorySettings;

/// Requests each chip from the remote service and writes it as it arrives.
pub struct RemoteComputeFactory<B> {
    config: RunConfig,
    boundary: B,
}

impl<B: ImageryBoundary> RemoteComputeFactory<B> {
    pub fn new(config: RunConfig, boundary: B) -> Self {
        Self { config, boundary }
    }

    fn image_unavailable(&self, source: EarthEngineError) -> FactoryError {
        warn!(image = %self.config.image(), error = %source, "Image is not accessible");
        FactoryError::ImageUnavailable {
            image: self.config.image().to_string(),
            source,
        }
    }
}

#[async_trait]
impl<B: ImageryBoundary> ChipFactory for RemoteComputeFactory<B> {
    fn variant(&self) -> FactoryVariant {
        FactoryVariant::RemoteCompute
    }

    fn run_config(&self) -> &RunConfig {
        &self.config
    }

    #[instrument(skip(self), fields(image = %self.config.image()))]
    async fn check_image(&self) -> Result<ImageInfo> {
        let info = self
            .boundary
            .image_info(self.config.image())
            .await
            .map_err(|e| self.image_unavailable(e))?;
        info!(bands = ?info.band_ids(), "Image is accessible");
        Ok(info)
    }

    #[instrument(skip(self), fields(image = %self.config.image()))]
    async fn list_bands(&self) -> Result<Vec<String>> {
        let bands = self
            .boundary
            .band_names(self.config.image())
            .await
            .map_err(|e| self.image_unavailable(e))?;
        debug!(bands = ?bands, "Listed bands");
        Ok(bands)
    }

    #[instrument(
        skip(self, params),
        fields(
            image = %self.config.image(),
            format = %self.config.output_format(),
            locations = self.config.locations().len()
        )
    )]
    async fn chip(&self, params: &ChipParams) -> Result<ChipReport> {
        info!("running remote compute chipper");
        self.check_chip_locations()?;
        params.validate()?;

        let output = self.config.output_location();
        let writer = ChipWriter::for_destination(self.config.output_format(), output)
            .map_err(FactoryError::UnsupportedOutput)?;

        let projection = self
            .boundary
            .projection_at_scale(&params.crs, params.scale)
            .await?;
        let settings = FactorySettings::resolve(&self.config, params, projection)?;
        info!(
            crs = %settings.projection.crs,
            scale_x = settings.scale_x,
            scale_y = settings.scale_y,
            chip_x = settings.chip_x,
            chip_y = settings.chip_y,
            request_limit = settings.request_limit,
            writer = writer.name(),
            "Resolved factory settings"
        );

        let mut report = ChipReport::begin(
            self.variant(),
            self.config.image(),
            self.config.locations().len(),
        );

        for (label, coordinate) in self.config.locations().labeled() {
            let request = settings.build_request(&coordinate);
            metrics::record_chip_request();

            let bytes = self
                .boundary
                .compute_pixels(&request)
                .await
                .map_err(|source| FactoryError::Compute {
                    label: label.clone(),
                    source,
                })?;

            let outcome = writer
                .write(ChipPayload::Encoded(bytes), output, &label)
                .map_err(|source| FactoryError::Write {
                    label: label.clone(),
                    source,
                })?;

            if outcome.path.is_some() {
                metrics::record_chip_written(settings.output_format);
            }
            debug!(
                label = %label,
                x = coordinate.x,
                y = coordinate.y,
                bytes = outcome.bytes,
                "Chip done"
            );

            report.push(WrittenChip {
                label,
                coordinate,
                path: outcome.path,
                bytes: outcome.bytes,
            });
        }

        let report = report.finish();
        info!(
            chips = report.chips.len(),
            files = report.files_written(),
            bytes = report.total_bytes(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Chipping complete"
        );
        Ok(report)
    }
}
