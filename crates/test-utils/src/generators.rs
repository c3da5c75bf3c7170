//! Test data generators for synthetic chip rasters.
//!
//! These generators create predictable, verifiable pixel patterns so
//! tests can check that samples land in the right row, column and band.

/// Creates a pixel-interleaved multi-band grid with predictable values.
///
/// Each sample is calculated as: `band * 1000 + row * width + col`
/// (wrapping at `u16::MAX`).
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `bands` - Number of samples per pixel
///
/// # Returns
///
/// A `Vec<u16>` in `[height, width, bands]` order.
///
/// # Example
///
/// ```
/// use test_utils::create_band_grid;
///
/// let grid = create_band_grid(4, 2, 3);
/// assert_eq!(grid.len(), 24);
/// assert_eq!(grid[0], 0);     // row 0, col 0, band 0
/// assert_eq!(grid[1], 1000);  // row 0, col 0, band 1
/// assert_eq!(grid[3], 1);     // row 0, col 1, band 0
/// ```
pub fn create_band_grid(width: usize, height: usize, bands: usize) -> Vec<u16> {
    let mut data = Vec::with_capacity(width * height * bands);
    for row in 0..height {
        for col in 0..width {
            for band in 0..bands {
                let value = band * 1000 + row * width + col;
                data.push((value % (u16::MAX as usize + 1)) as u16);
            }
        }
    }
    data
}

/// Creates a single-band reflectance-like grid of `f32` values in `[0, 1]`.
///
/// The values increase from the top-left to the bottom-right corner.
pub fn create_reflectance_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = (width + height).saturating_sub(2).max(1) as f32;
    for row in 0..height {
        for col in 0..width {
            data.push((row + col) as f32 / span);
        }
    }
    data
}

/// Creates `count` chip anchors along a diagonal starting at `(x0, y0)`.
///
/// Each step moves `step` units east and north.
pub fn create_test_locations(count: usize, x0: f64, y0: f64, step: f64) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| (x0 + i as f64 * step, y0 + i as f64 * step))
        .collect()
}
