//! Chip payload codecs and output writers.
//!
//! Chips come back from the remote service either as an encoded file
//! (GeoTIFF or NPY bytes) or are held in memory as a [`ChipArray`]. This
//! crate turns both into files on disk:
//!
//! ```text
//! ChipPayload ──► ChipWriter::for_destination(format, location)
//!                     │
//!                     ├─► GeoTiff   {label}.tif   (byte stream kept, array re-encoded as u16)
//!                     ├─► Npy       {label}.npy   (byte stream kept, array serialized)
//!                     ├─► TfRecord  nothing written
//!                     └─► BlobUpload nothing written
//! ```

pub mod array;
pub mod error;
pub mod geotiff;
pub mod npy;
pub mod writers;

pub use array::{ChipArray, GeoReference, SampleBuffer, SampleType};
pub use error::{RasterError, RasterResult};
pub use geotiff::{decode_geotiff, encode_geotiff, read_profile, RasterProfile};
pub use npy::{decode_npy, encode_npy, read_npy};
pub use writers::{chip_path, ChipPayload, ChipWriter, WriteOutcome};
