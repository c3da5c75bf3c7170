//! Chip factory for imagery on the local filesystem.
//!
//! Validates and logs only; no local imagery is read yet.

use async_trait::async_trait;
use earth_engine::ImageInfo;
use tracing::{info, instrument};

use crate::config::RunConfig;
use crate::error::Result;
use crate::factory::{ChipFactory, ChipReport, FactoryVariant};
use crate::params::ChipParams;

pub struct LocalFactory {
    config: RunConfig,
}

impl LocalFactory {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChipFactory for LocalFactory {
    fn variant(&self) -> FactoryVariant {
        FactoryVariant::Local
    }

    fn run_config(&self) -> &RunConfig {
        &self.config
    }

    async fn check_image(&self) -> Result<ImageInfo> {
        Ok(ImageInfo::minimal(self.config.image()))
    }

    async fn list_bands(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    #[instrument(skip(self, _params), fields(image = %self.config.image()))]
    async fn chip(&self, _params: &ChipParams) -> Result<ChipReport> {
        self.check_chip_locations()?;
        info!("running local specific chipper");
        let report = ChipReport::begin(
            self.variant(),
            self.config.image(),
            self.config.locations().len(),
        );
        Ok(report.finish())
    }
}
