//! `image:computePixels` request body.

use chip_common::{AffineTransform, OutputFormat};
use serde::{Deserialize, Serialize};

use crate::expression::Expression;

/// One pixel request, serialized as the REST body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePixelsRequest {
    pub expression: Expression,
    pub file_format: OutputFormat,
    /// Empty means every band of the image.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub band_ids: Vec<String>,
    pub grid: PixelGrid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub workload_tag: String,
}

/// Output pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelGrid {
    pub dimensions: GridDimensions,
    pub affine_transform: AffineTransform,
    pub crs_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl ComputePixelsRequest {
    /// Upper-left corner of the grid in CRS units.
    pub fn origin(&self) -> (f64, f64) {
        let t = &self.grid.affine_transform;
        (t.translate_x, t.translate_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip_common::Coordinate;
    use serde_json::json;

    fn request(bands: Vec<String>) -> ComputePixelsRequest {
        ComputePixelsRequest {
            expression: Expression::image_load("img"),
            file_format: OutputFormat::GeoTiff,
            band_ids: bands,
            grid: PixelGrid {
                dimensions: GridDimensions {
                    width: 256,
                    height: 128,
                },
                affine_transform: AffineTransform::axis_aligned(
                    0.5,
                    -0.5,
                    Coordinate::new(-16.70, 13.37),
                ),
                crs_code: "EPSG:4326".to_string(),
            },
            workload_tag: "test".to_string(),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(request(vec!["b1".into(), "b2".into()])).unwrap();

        assert_eq!(value["fileFormat"], "GEO_TIFF");
        assert_eq!(value["bandIds"], json!(["b1", "b2"]));
        assert_eq!(value["workloadTag"], "test");
        assert_eq!(value["grid"]["dimensions"], json!({"width": 256, "height": 128}));
        assert_eq!(value["grid"]["crsCode"], "EPSG:4326");
        assert_eq!(
            value["grid"]["affineTransform"],
            json!({
                "scaleX": 0.5, "shearX": 0.0, "translateX": -16.70,
                "shearY": 0.0, "scaleY": -0.5, "translateY": 13.37
            })
        );
    }

    #[test]
    fn test_empty_bands_omitted() {
        let value = serde_json::to_value(request(Vec::new())).unwrap();
        assert!(value.get("bandIds").is_none());
    }

    #[test]
    fn test_origin() {
        assert_eq!(request(Vec::new()).origin(), (-16.70, 13.37));
    }
}
