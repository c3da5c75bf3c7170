//! Earth Engine REST access for the chip factory.
//!
//! The factory never talks HTTP directly. It goes through the
//! [`ImageryBoundary`] trait, which has four operations:
//!
//! - `image_info`: resolve image metadata (band ids and properties)
//! - `band_names`: evaluate `Image.bandNames` for an image
//! - `projection_at_scale`: resolve a CRS at a nominal scale in meters
//! - `compute_pixels`: fetch one encoded chip
//!
//! [`EarthEngineClient`] implements the boundary against the REST API,
//! posting expression graphs to `value:compute` and pixel requests to
//! `image:computePixels`.

pub mod boundary;
pub mod client;
pub mod config;
pub mod error;
pub mod expression;
pub mod request;

pub use boundary::{BandInfo, ImageInfo, ImageryBoundary};
pub use client::EarthEngineClient;
pub use config::{EarthEngineConfig, HIGH_VOLUME_API_BASE_URL};
pub use error::{EarthEngineError, EarthEngineResult};
pub use expression::{Expression, FunctionInvocation, ValueNode};
pub use request::{ComputePixelsRequest, GridDimensions, PixelGrid};
