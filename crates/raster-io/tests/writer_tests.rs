//! Tests for writer dispatch across output formats.

use std::path::Path;

use bytes::Bytes;
use chip_common::OutputFormat;
use raster_io::{encode_npy, read_profile, ChipArray, ChipPayload, ChipWriter, SampleBuffer};
use test_utils::{create_band_grid, list_file_names, temp_output_dir};

fn small_array() -> ChipArray {
    ChipArray::new(vec![8, 8, 2], SampleBuffer::U16(create_band_grid(8, 8, 2))).unwrap()
}

// ============================================================================
// File-producing writers
// ============================================================================

#[test]
fn test_geotiff_writer_from_array_payload() {
    let dir = temp_output_dir();
    let writer = ChipWriter::for_format(OutputFormat::GeoTiff).unwrap();

    let outcome = writer
        .write(ChipPayload::Array(small_array()), dir.path(), "chip_000")
        .unwrap();

    let bytes = std::fs::read(outcome.path.unwrap()).unwrap();
    let profile = read_profile(&bytes).unwrap();
    assert_eq!((profile.width, profile.height, profile.bands), (8, 8, 2));
}

#[test]
fn test_npy_writer_from_encoded_payload() {
    let dir = temp_output_dir();
    let writer = ChipWriter::for_format(OutputFormat::Npy).unwrap();
    let encoded = Bytes::from(encode_npy(&small_array()).unwrap());

    let outcome = writer
        .write(ChipPayload::Encoded(encoded.clone()), dir.path(), "chip_004")
        .unwrap();

    assert_eq!(outcome.bytes, encoded.len());
    assert_eq!(list_file_names(dir.path()), vec!["chip_004.npy"]);
}

#[test]
fn test_labels_map_to_distinct_files() {
    let dir = temp_output_dir();
    let writer = ChipWriter::for_format(OutputFormat::Npy).unwrap();

    for label in ["chip_000", "chip_001", "chip_002"] {
        writer
            .write(ChipPayload::Array(small_array()), dir.path(), label)
            .unwrap();
    }

    assert_eq!(
        list_file_names(dir.path()),
        vec!["chip_000.npy", "chip_001.npy", "chip_002.npy"]
    );
}

// ============================================================================
// Writers that produce nothing
// ============================================================================

#[test]
fn test_tfrecord_writer_writes_nothing() {
    let dir = temp_output_dir();
    let writer = ChipWriter::for_format(OutputFormat::TfRecordImage).unwrap();

    let outcome = writer
        .write(ChipPayload::Array(small_array()), dir.path(), "chip_000")
        .unwrap();

    assert_eq!(outcome.path, None);
    assert_eq!(outcome.bytes, 0);
    assert!(list_file_names(dir.path()).is_empty());
}

#[test]
fn test_blob_upload_writes_nothing() {
    let writer =
        ChipWriter::for_destination(OutputFormat::GeoTiff, Path::new("gs://chips/run-1")).unwrap();
    assert_eq!(writer.name(), "blob_upload");

    let outcome = writer
        .write(
            ChipPayload::Encoded(Bytes::from_static(b"II*\0")),
            Path::new("gs://chips/run-1"),
            "chip_000",
        )
        .unwrap();
    assert_eq!(outcome.path, None);
}
