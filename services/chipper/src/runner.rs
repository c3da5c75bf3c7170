//! Factory construction and job execution.

use std::path::Path;

use anyhow::{Context, Result};
use chip_factory::{
    CatalogFactory, ChipFactory, ChipReport, FactoryVariant, LocalFactory, RemoteComputeFactory,
};
use earth_engine::{EarthEngineClient, EarthEngineConfig};
use tracing::info;

use crate::config::ChipJobConfig;

/// What the binary should do with the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CheckImage,
    ListBands,
    Chip,
}

/// Build the factory variant named in the job file.
///
/// Remote compute connects with `ee_config`; the job's `cloud_project`
/// takes precedence over the project it names. Other variants ignore it.
pub fn build_factory(
    job: &ChipJobConfig,
    output_override: Option<&Path>,
    mut ee_config: EarthEngineConfig,
) -> Result<Box<dyn ChipFactory>> {
    let run = job.run_config(output_override);

    let factory: Box<dyn ChipFactory> = match job.factory.variant {
        FactoryVariant::RemoteCompute => {
            if let Some(project) = &job.factory.cloud_project {
                ee_config.project = project.clone();
            }
            let client = EarthEngineClient::initialize(ee_config)
                .context("Failed to initialize Earth Engine client")?;
            Box::new(RemoteComputeFactory::new(run, client))
        }
        FactoryVariant::Catalog => Box::new(CatalogFactory::new(run)),
        FactoryVariant::Local => Box::new(LocalFactory::new(run)),
    };

    info!(variant = %factory.variant(), "Factory ready");
    Ok(factory)
}

/// Outcome of one invocation.
#[derive(Debug)]
pub enum Outcome {
    Image(earth_engine::ImageInfo),
    Bands(Vec<String>),
    Chips(ChipReport),
}

/// Run one action against a factory.
pub async fn run(
    factory: &dyn ChipFactory,
    job: &ChipJobConfig,
    action: Action,
) -> Result<Outcome> {
    match action {
        Action::CheckImage => {
            let info = factory.check_image().await?;
            Ok(Outcome::Image(info))
        }
        Action::ListBands => {
            let bands = factory.list_bands().await?;
            Ok(Outcome::Bands(bands))
        }
        Action::Chip => {
            let report = factory
                .chip(&job.chip)
                .await
                .context("Chipping run failed")?;
            Ok(Outcome::Chips(report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JOB: &str = r#"
factory:
  variant: catalog
  image: catalog/item
  output_location: /tmp/chips
  output_format: GEO_TIFF
locations:
  - [-16.70, 13.37]
chip:
  scale: 10
"#;

    #[test]
    fn test_build_catalog_factory() {
        let job = ChipJobConfig::parse(CATALOG_JOB).unwrap();
        let factory = build_factory(&job, None, EarthEngineConfig::default()).unwrap();
        assert_eq!(factory.variant(), FactoryVariant::Catalog);
    }

    #[tokio::test]
    async fn test_run_catalog_actions() {
        let dir = tempfile::tempdir().unwrap();
        let job = ChipJobConfig::parse(CATALOG_JOB).unwrap();
        let factory = build_factory(&job, Some(dir.path()), EarthEngineConfig::default()).unwrap();

        match run(factory.as_ref(), &job, Action::Chip).await.unwrap() {
            Outcome::Chips(report) => {
                assert_eq!(report.requested, 1);
                assert!(report.chips.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        match run(factory.as_ref(), &job, Action::ListBands).await.unwrap() {
            Outcome::Bands(bands) => assert!(bands.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    fn remote_job(cloud_project: Option<&str>) -> ChipJobConfig {
        let yaml = CATALOG_JOB.replace("variant: catalog", "variant: remote_compute");
        let mut job = ChipJobConfig::parse(&yaml).unwrap();
        job.factory.cloud_project = cloud_project.map(String::from);
        job
    }

    #[test]
    fn test_remote_factory_needs_token() {
        let job = remote_job(Some("pc511-gambia-training"));
        let ee_config = EarthEngineConfig::for_project("pc511-gambia-training");
        assert!(build_factory(&job, None, ee_config).is_err());
    }

    #[test]
    fn test_remote_factory_needs_project() {
        let job = remote_job(None);
        let ee_config = EarthEngineConfig::default().with_access_token("ya29.test-token");
        assert!(build_factory(&job, None, ee_config).is_err());
    }

    #[test]
    fn test_job_project_fills_missing_project() {
        let job = remote_job(Some("pc511-gambia-training"));
        let ee_config = EarthEngineConfig::default().with_access_token("ya29.test-token");
        let factory = build_factory(&job, None, ee_config).unwrap();
        assert_eq!(factory.variant(), FactoryVariant::RemoteCompute);
    }
}
