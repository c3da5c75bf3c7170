//! Chip factories.
//!
//! A factory takes a [`RunConfig`] (image, chip locations, output location
//! and format) and, for a set of [`ChipParams`], produces one chip file per
//! location.
//!
//! # Architecture
//!
//! ```text
//! ChipFactory::chip(params)
//!      │
//!      ├─► check_chip_locations / params.validate
//!      │
//!      ├─► ChipWriter::for_destination(format, output_location)
//!      │
//!      ├─► boundary.projection_at_scale(crs, scale)
//!      │         │
//!      │         └─► FactorySettings (scale_y sign flipped for north-up)
//!      │
//!      └─► for each (chip_NNN, coordinate):
//!               build_request ─► compute_pixels ─► writer.write
//! ```
//!
//! Three variants implement [`ChipFactory`]: [`RemoteComputeFactory`] does
//! the work above against an [`earth_engine::ImageryBoundary`];
//! [`CatalogFactory`] and [`LocalFactory`] only validate and log.

pub mod catalog;
pub mod config;
pub mod error;
pub mod factory;
pub mod local;
pub mod metrics;
pub mod params;
pub mod remote;
pub mod settings;

pub use catalog::CatalogFactory;
pub use config::RunConfig;
pub use error::{FactoryError, Result};
pub use factory::{ChipFactory, ChipReport, FactoryVariant, WrittenChip};
pub use local::LocalFactory;
pub use params::{ChipAnchor, ChipParams};
pub use remote::RemoteComputeFactory;
pub use settings::FactorySettings;
