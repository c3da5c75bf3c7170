//! Shared test utilities for the chip factory workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic multi-band raster generators
//! - Chip location and projection fixtures
//! - Temporary output directories and listings
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_band_grid, fixtures, temp_output_dir};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Create a fresh temporary directory for chip output.
///
/// The directory is removed when the returned guard is dropped.
pub fn temp_output_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("chips-")
        .tempdir()
        .expect("failed to create temporary output directory")
}

/// Sorted file names in a directory (empty if it does not exist).
pub fn list_file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
