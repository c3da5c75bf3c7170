//! Common types shared across the chip factory crates.
//!
//! A chip is a fixed-size raster tile requested from a remote imagery
//! service at a coordinate. This crate holds the vocabulary every other
//! crate speaks: where chips are anchored, how they are labelled, which
//! formats they are written in and how their pixel grid maps to the ground.

pub mod coords;
pub mod error;
pub mod format;
pub mod transform;

pub use coords::{chip_label, ChipLocations, Coordinate};
pub use error::{ChipError, ChipResult};
pub use format::OutputFormat;
pub use transform::{is_geographic_crs, AffineTransform, ProjectionInfo};
