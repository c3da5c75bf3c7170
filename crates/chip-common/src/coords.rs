//! Chip anchor coordinates and index labels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChipError, ChipResult};

/// A chip anchor in the request CRS.
///
/// `x` is longitude (or easting), `y` is latitude (or northing). On the
/// wire a coordinate is always a two-element sequence `[x, y]`; a bare
/// number, a map or a sequence of any other length is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.x, c.y]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Label for the chip at `index` in a run: `chip_000`, `chip_001`, ...
///
/// Labels are zero-padded to three digits and keep growing past 999.
pub fn chip_label(index: usize) -> String {
    format!("chip_{:03}", index)
}

/// Ordered list of chip anchors for a run.
///
/// Order is significant: the position of a coordinate decides its label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipLocations(Vec<Coordinate>);

impl ChipLocations {
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self(coords)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(label, coordinate)` pairs in input order.
    pub fn labeled(&self) -> impl Iterator<Item = (String, Coordinate)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, c)| (chip_label(i), *c))
    }

    /// Reject coordinates with NaN or infinite components.
    pub fn validate(&self) -> ChipResult<()> {
        for (index, coord) in self.0.iter().enumerate() {
            if !coord.is_finite() {
                return Err(ChipError::InvalidLocation {
                    index,
                    reason: format!("coordinate {} is not finite", coord),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Coordinate>> for ChipLocations {
    fn from(coords: Vec<Coordinate>) -> Self {
        Self(coords)
    }
}

impl From<Vec<(f64, f64)>> for ChipLocations {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        Self(pairs.into_iter().map(Coordinate::from).collect())
    }
}

impl<'a> IntoIterator for &'a ChipLocations {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
