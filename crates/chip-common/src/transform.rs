//! Affine transforms and resolved projections.

use serde::{Deserialize, Serialize};

use crate::coords::Coordinate;
use crate::error::{ChipError, ChipResult};

/// Pixel-to-ground affine transform for a chip grid.
///
/// Ground coordinates of pixel `(col, row)` are
/// `x = translate_x + col * scale_x + row * shear_x` and
/// `y = translate_y + col * shear_y + row * scale_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub shear_x: f64,
    pub translate_x: f64,
    pub shear_y: f64,
    pub scale_y: f64,
    pub translate_y: f64,
}

impl AffineTransform {
    /// Axis-aligned transform with its origin at `origin`.
    pub fn axis_aligned(scale_x: f64, scale_y: f64, origin: Coordinate) -> Self {
        Self {
            scale_x,
            shear_x: 0.0,
            translate_x: origin.x,
            shear_y: 0.0,
            scale_y,
            translate_y: origin.y,
        }
    }

    /// Build from the six-element `[scaleX, shearX, translateX, shearY, scaleY, translateY]`
    /// layout the remote service reports projections in.
    pub fn from_coefficients(c: [f64; 6]) -> Self {
        Self {
            scale_x: c[0],
            shear_x: c[1],
            translate_x: c[2],
            shear_y: c[3],
            scale_y: c[4],
            translate_y: c[5],
        }
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.scale_x,
            self.shear_x,
            self.translate_x,
            self.shear_y,
            self.scale_y,
            self.translate_y,
        ]
    }
}

/// A projection resolved at a given scale by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInfo {
    pub crs: String,
    pub transform: [f64; 6],
}

impl ProjectionInfo {
    pub fn new(crs: impl Into<String>, transform: [f64; 6]) -> Self {
        Self {
            crs: crs.into(),
            transform,
        }
    }

    /// Horizontal pixel size.
    pub fn scale_x(&self) -> f64 {
        self.transform[0]
    }

    /// Vertical pixel size for north-up output.
    ///
    /// Projections come back with a positive vertical scale; image rows grow
    /// southwards, so the sign is flipped.
    pub fn north_up_scale_y(&self) -> f64 {
        -self.transform[4]
    }

    /// Reject degenerate projections before building requests from them.
    pub fn validate(&self) -> ChipResult<()> {
        if self.crs.trim().is_empty() {
            return Err(ChipError::InvalidProjection("empty CRS code".to_string()));
        }
        if self.transform.iter().any(|v| !v.is_finite()) {
            return Err(ChipError::InvalidProjection(format!(
                "non-finite transform {:?}",
                self.transform
            )));
        }
        if self.transform[0] == 0.0 || self.transform[4] == 0.0 {
            return Err(ChipError::InvalidProjection(format!(
                "zero pixel scale in transform {:?}",
                self.transform
            )));
        }
        Ok(())
    }
}

/// Check if an EPSG code names a geographic (degree-based) CRS.
pub fn is_geographic_crs(code: u16) -> bool {
    matches!(code, 4326 | 4269 | 4258 | 4283 | 4612 | 4674)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient_layout() {
        let t = AffineTransform::from_coefficients([10.0, 0.5, 100.0, 0.25, -10.0, 200.0]);
        assert_eq!(t.scale_x, 10.0);
        assert_eq!(t.shear_x, 0.5);
        assert_eq!(t.translate_x, 100.0);
        assert_eq!(t.shear_y, 0.25);
        assert_eq!(t.scale_y, -10.0);
        assert_eq!(t.translate_y, 200.0);
        assert_eq!(t.coefficients(), [10.0, 0.5, 100.0, 0.25, -10.0, 200.0]);
    }

    #[test]
    fn test_axis_aligned_origin() {
        let t = AffineTransform::axis_aligned(2.0, -2.0, Coordinate::new(100.0, 50.0));
        assert_eq!(t.coefficients(), [2.0, 0.0, 100.0, 0.0, -2.0, 50.0]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let t = AffineTransform::axis_aligned(1.0, -1.0, Coordinate::new(3.0, 4.0));
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["scaleX"], 1.0);
        assert_eq!(json["shearX"], 0.0);
        assert_eq!(json["translateX"], 3.0);
        assert_eq!(json["scaleY"], -1.0);
        assert_eq!(json["translateY"], 4.0);
    }

    #[test]
    fn test_north_up_flip() {
        let p = ProjectionInfo::new("EPSG:4326", [8.98e-5, 0.0, 0.0, 0.0, 8.98e-5, 0.0]);
        assert_eq!(p.scale_x(), 8.98e-5);
        assert_eq!(p.north_up_scale_y(), -8.98e-5);
    }

    #[test]
    fn test_projection_validate() {
        assert!(ProjectionInfo::new("EPSG:4326", [1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .validate()
            .is_ok());
        assert!(ProjectionInfo::new("", [1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .validate()
            .is_err());
        assert!(ProjectionInfo::new("EPSG:4326", [0.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .validate()
            .is_err());
    }
}
