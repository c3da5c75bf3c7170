//! Chip factory for a static catalog of pre-tiled imagery.
//!
//! Validates and logs only; no catalog is read yet.

use async_trait::async_trait;
use earth_engine::ImageInfo;
use tracing::{info, instrument};

use crate::config::RunConfig;
use crate::error::Result;
use crate::factory::{ChipFactory, ChipReport, FactoryVariant};
use crate::params::ChipParams;

pub struct CatalogFactory {
    config: RunConfig,
}

impl CatalogFactory {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChipFactory for CatalogFactory {
    fn variant(&self) -> FactoryVariant {
        FactoryVariant::Catalog
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
        info!("running catalog specific chipper");
        let report = ChipReport::begin(
            self.variant(),
            self.config.image(),
            self.config.locations().len(),
        );
        Ok(report.finish())
    }
}
