//! The remote imagery boundary.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chip_common::ProjectionInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EarthEngineResult;
use crate::request::ComputePixelsRequest;

/// Image metadata as resolved by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub bands: Vec<BandInfo>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One band of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandInfo {
    pub id: String,
    #[serde(default)]
    pub crs: Option<String>,
    /// `[width, height]` in pixels.
    #[serde(default)]
    pub dimensions: Option<[u64; 2]>,
    #[serde(default)]
    pub data_type: Option<Value>,
}

impl ImageInfo {
    /// Metadata with an id and nothing else.
    pub fn minimal(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Band ids in image order.
    pub fn band_ids(&self) -> Vec<String> {
        self.bands.iter().map(|b| b.id.clone()).collect()
    }
}

/// Operations the chip factory needs from the imagery service.
#[async_trait]
pub trait ImageryBoundary: Send + Sync {
    /// Resolve image metadata. Fails when the image is missing or not
    /// readable with the current credentials.
    async fn image_info(&self, image: &str) -> EarthEngineResult<ImageInfo>;

    /// Band names of an image, in image order.
    async fn band_names(&self, image: &str) -> EarthEngineResult<Vec<String>>;

    /// Resolve `crs` at a nominal scale in meters.
    async fn projection_at_scale(&self, crs: &str, scale: f64)
        -> EarthEngineResult<ProjectionInfo>;

    /// Fetch one chip, encoded in the request's file format.
    async fn compute_pixels(&self, request: &ComputePixelsRequest) -> EarthEngineResult<Bytes>;
}

#[async_trait]
impl<T: ImageryBoundary + ?Sized> ImageryBoundary for Arc<T> {
    async fn image_info(&self, image: &str) -> EarthEngineResult<ImageInfo> {
        (**self).image_info(image).await
    }

    async fn band_names(&self, image: &str) -> EarthEngineResult<Vec<String>> {
        (**self).band_names(image).await
    }

    async fn projection_at_scale(
        &self,
        crs: &str,
        scale: f64,
    ) -> EarthEngineResult<ProjectionInfo> {
        (**self).projection_at_scale(crs, scale).await
    }

    async fn compute_pixels(&self, request: &ComputePixelsRequest) -> EarthEngineResult<Bytes> {
        (**self).compute_pixels(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_info() {
        let json = r#"{
            "type": "Image",
            "id": "projects/p/assets/rgb",
            "version": 1700000000000000,
            "bands": [
                {"id": "b1", "data_type": {"type": "PixelType", "precision": "int"},
                 "dimensions": [4096, 4096], "crs": "EPSG:32628"},
                {"id": "b2", "crs": "EPSG:32628"},
                {"id": "b3"}
            ],
            "properties": {"system:asset_size": 1024}
        }"#;
        let info: ImageInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.id, "projects/p/assets/rgb");
        assert_eq!(info.band_ids(), vec!["b1", "b2", "b3"]);
        assert_eq!(info.bands[0].dimensions, Some([4096, 4096]));
        assert_eq!(info.bands[2].crs, None);
        assert!(info.properties.contains_key("system:asset_size"));
    }

    #[test]
    fn test_minimal() {
        let info = ImageInfo::minimal("catalog/item");
        assert_eq!(info.id, "catalog/item");
        assert!(info.band_ids().is_empty());
    }
}
