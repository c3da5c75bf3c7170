//! Per-format chip writers.
//!
//! Every writer takes a payload, an output directory and an index label,
//! creates the directory when it is missing and writes at most one file,
//! `{label}.{ext}`. The TFRecord and blob-upload writers are placeholders
//! that write nothing.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chip_common::OutputFormat;
use tracing::{debug, warn};

use crate::array::{ChipArray, SampleBuffer};
use crate::error::{RasterError, RasterResult};
use crate::geotiff::{self, RasterProfile};
use crate::npy;

/// URI schemes that route chips to the blob-upload writer.
const REMOTE_SCHEMES: [&str; 2] = ["gs://", "s3://"];

/// Pixel data handed to a writer.
#[derive(Debug, Clone)]
pub enum ChipPayload {
    /// An encoded file exactly as returned by the remote service.
    Encoded(Bytes),
    /// A decoded in-memory array.
    Array(ChipArray),
}

impl ChipPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoded(_) => "encoded",
            Self::Array(_) => "array",
        }
    }
}

/// What a writer produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Path of the written file; `None` for writers that write nothing.
    pub path: Option<PathBuf>,
    pub bytes: usize,
    /// Source profile, for GeoTIFF byte streams.
    pub profile: Option<RasterProfile>,
}

impl WriteOutcome {
    fn skipped() -> Self {
        Self {
            path: None,
            bytes: 0,
            profile: None,
        }
    }
}

/// Output writer selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipWriter {
    GeoTiff,
    Npy,
    TfRecord,
    BlobUpload,
}

impl ChipWriter {
    /// Select the writer for an output format.
    ///
    /// `NUMPY_NDARRAY` names an in-memory result and has no file writer.
    pub fn for_format(format: OutputFormat) -> RasterResult<Self> {
        match format {
            OutputFormat::GeoTiff => Ok(Self::GeoTiff),
            OutputFormat::Npy => Ok(Self::Npy),
            OutputFormat::TfRecordImage => Ok(Self::TfRecord),
            OutputFormat::NumpyNdarray => Err(RasterError::UnsupportedFormat(format)),
        }
    }

    /// Select the writer for a format and destination.
    ///
    /// Remote object-store destinations go to the blob-upload writer once
    /// the format itself is known to be writable.
    pub fn for_destination(format: OutputFormat, location: &Path) -> RasterResult<Self> {
        let writer = Self::for_format(format)?;
        if is_remote_location(location) {
            return Ok(Self::BlobUpload);
        }
        Ok(writer)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GeoTiff => "geotiff",
            Self::Npy => "npy",
            Self::TfRecord => "tfrecord",
            Self::BlobUpload => "blob_upload",
        }
    }

    /// Write one chip.
    pub fn write(
        &self,
        payload: ChipPayload,
        output_dir: &Path,
        label: &str,
    ) -> RasterResult<WriteOutcome> {
        match (*self, payload) {
            (Self::GeoTiff, ChipPayload::Encoded(bytes)) => {
                write_geotiff_bytes(&bytes, output_dir, label)
            }
            (Self::GeoTiff, ChipPayload::Array(array)) => {
                write_geotiff_array(&array, output_dir, label)
            }
            (Self::Npy, ChipPayload::Encoded(bytes)) => write_npy_bytes(&bytes, output_dir, label),
            (Self::Npy, ChipPayload::Array(array)) => write_npy_array(&array, output_dir, label),
            (Self::TfRecord, payload) => write_tfrecord(&payload, output_dir, label),
            (Self::BlobUpload, payload) => blob_upload(&payload, output_dir, label),
        }
    }
}

/// `{output_dir}/{label}.{ext}`
pub fn chip_path(output_dir: &Path, label: &str, ext: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", label, ext))
}

fn is_remote_location(location: &Path) -> bool {
    let s = location.to_string_lossy();
    REMOTE_SCHEMES.iter().any(|scheme| s.starts_with(scheme))
}

fn write_file(output_dir: &Path, label: &str, ext: &str, data: &[u8]) -> RasterResult<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = chip_path(output_dir, label, ext);
    fs::write(&path, data)?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote chip");
    Ok(path)
}

/// Write an array as an unsigned 16-bit multi-band GeoTIFF.
///
/// Accepts `[height, width]` or `[height, width, bands]`; samples outside
/// the u16 range are clamped.
pub fn write_geotiff_array(
    array: &ChipArray,
    output_dir: &Path,
    label: &str,
) -> RasterResult<WriteOutcome> {
    let (height, width, bands) = array.raster_dims()?;
    let samples = SampleBuffer::U16(array.data.to_u16_saturating());
    let mut raster = ChipArray::new(vec![height, width, bands], samples)?;
    raster.georef = array.georef;

    let encoded = geotiff::encode_geotiff(&raster)?;
    let path = write_file(output_dir, label, "tif", &encoded)?;
    Ok(WriteOutcome {
        path: Some(path),
        bytes: encoded.len(),
        profile: None,
    })
}

/// Write an encoded GeoTIFF byte stream.
///
/// The stream is read first to check it is a TIFF and to capture its
/// profile, then written unchanged so dimensions, bands, sample type and
/// CRS all carry over.
pub fn write_geotiff_bytes(
    bytes: &[u8],
    output_dir: &Path,
    label: &str,
) -> RasterResult<WriteOutcome> {
    let profile = geotiff::read_profile(bytes)?;
    debug!(
        label = %label,
        width = profile.width,
        height = profile.height,
        bands = profile.bands,
        epsg = ?profile.epsg,
        "GeoTIFF profile"
    );
    let path = write_file(output_dir, label, "tif", bytes)?;
    Ok(WriteOutcome {
        path: Some(path),
        bytes: bytes.len(),
        profile: Some(profile),
    })
}

/// Write an array as NPY.
pub fn write_npy_array(
    array: &ChipArray,
    output_dir: &Path,
    label: &str,
) -> RasterResult<WriteOutcome> {
    let encoded = npy::encode_npy(array)?;
    let path = write_file(output_dir, label, "npy", &encoded)?;
    Ok(WriteOutcome {
        path: Some(path),
        bytes: encoded.len(),
        profile: None,
    })
}

/// Write an NPY byte stream unchanged after checking its header and body.
pub fn write_npy_bytes(bytes: &[u8], output_dir: &Path, label: &str) -> RasterResult<WriteOutcome> {
    let header = npy::parse_header(bytes)?;
    header.check_body(bytes)?;
    debug!(label = %label, shape = ?header.array_shape(), "NPY header");
    let path = write_file(output_dir, label, "npy", bytes)?;
    Ok(WriteOutcome {
        path: Some(path),
        bytes: bytes.len(),
        profile: None,
    })
}

/// TFRecord output is accepted but not written.
pub fn write_tfrecord(
    payload: &ChipPayload,
    output_dir: &Path,
    label: &str,
) -> RasterResult<WriteOutcome> {
    warn!(
        label = %label,
        output_dir = %output_dir.display(),
        payload = payload.kind(),
        "TFRecord writer is not implemented, chip not written"
    );
    Ok(WriteOutcome::skipped())
}

/// Placeholder for object-store destinations; writes nothing.
pub fn blob_upload(
    payload: &ChipPayload,
    destination: &Path,
    label: &str,
) -> RasterResult<WriteOutcome> {
    warn!(
        label = %label,
        destination = %destination.display(),
        payload = payload.kind(),
        "Blob upload is not implemented, chip not uploaded"
    );
    Ok(WriteOutcome::skipped())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_dispatch() {
        assert_eq!(ChipWriter::for_format(OutputFormat::GeoTiff).unwrap(), ChipWriter::GeoTiff);
        assert_eq!(ChipWriter::for_format(OutputFormat::Npy).unwrap(), ChipWriter::Npy);
        assert_eq!(
            ChipWriter::for_format(OutputFormat::TfRecordImage).unwrap(),
            ChipWriter::TfRecord
        );
        assert!(matches!(
            ChipWriter::for_format(OutputFormat::NumpyNdarray),
            Err(RasterError::UnsupportedFormat(OutputFormat::NumpyNdarray))
        ));
    }

    #[test]
    fn test_remote_destination_uses_blob_upload() {
        let writer =
            ChipWriter::for_destination(OutputFormat::GeoTiff, Path::new("gs://bucket/chips"))
                .unwrap();
        assert_eq!(writer, ChipWriter::BlobUpload);

        let local =
            ChipWriter::for_destination(OutputFormat::GeoTiff, Path::new("/data/chips")).unwrap();
        assert_eq!(local, ChipWriter::GeoTiff);
    }

    #[test]
    fn test_remote_destination_still_checks_format() {
        assert!(ChipWriter::for_destination(
            OutputFormat::NumpyNdarray,
            Path::new("s3://bucket/chips")
        )
        .is_err());
    }

    #[test]
    fn test_chip_path() {
        assert_eq!(
            chip_path(Path::new("/out"), "chip_003", "tif"),
            PathBuf::from("/out/chip_003.tif")
        );
    }
}
