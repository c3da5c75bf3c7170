//! REST client for Earth Engine.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chip_common::ProjectionInfo;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::boundary::{ImageInfo, ImageryBoundary};
use crate::config::EarthEngineConfig;
use crate::error::{EarthEngineError, EarthEngineResult};
use crate::expression::Expression;
use crate::request::ComputePixelsRequest;

const USER_PROJECT_HEADER: &str = "x-goog-user-project";

/// Earth Engine REST client bound to one cloud project.
#[derive(Debug, Clone)]
pub struct EarthEngineClient {
    http: Client,
    config: EarthEngineConfig,
}

#[derive(Serialize)]
struct ComputeValueRequest<'a> {
    expression: &'a Expression,
}

#[derive(Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

impl EarthEngineClient {
    /// Validate the configuration and build the HTTP client.
    ///
    /// Must succeed before any other call.
    pub fn initialize(config: EarthEngineConfig) -> EarthEngineResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()?;

        info!(
            project = %config.project,
            base_url = %config.base_url,
            api_version = %config.api_version,
            "Earth Engine client initialized"
        );

        Ok(Self { http, config })
    }

    /// Evaluate an expression graph and deserialize its result.
    #[instrument(skip(self, expression), fields(project = %self.config.project))]
    pub async fn compute_value<T: DeserializeOwned>(
        &self,
        expression: &Expression,
    ) -> EarthEngineResult<T> {
        let response = self
            .post("value:compute", &ComputeValueRequest { expression })
            .await?;
        let body: ComputeValueResponse = response.json().await?;
        serde_json::from_value(body.result).map_err(|e| {
            EarthEngineError::invalid_response(format!("unexpected value:compute result: {}", e))
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> EarthEngineResult<Response> {
        let url = self.config.project_url(method);
        debug!(url = %url, "POST");

        let mut request = self
            .http
            .post(url.as_str())
            .header(USER_PROJECT_HEADER, &self.config.project)
            .header(header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = EarthEngineError::from_response(status.as_u16(), &text);
        warn!(url = %url, status = status.as_u16(), error = %err, "Earth Engine request failed");
        Err(err)
    }
}

#[async_trait]
impl ImageryBoundary for EarthEngineClient {
    #[instrument(skip(self))]
    async fn image_info(&self, image: &str) -> EarthEngineResult<ImageInfo> {
        let mut info: ImageInfo = self.compute_value(&Expression::image_load(image)).await?;
        if info.id.is_empty() {
            info.id = image.to_string();
        }
        debug!(image = %image, bands = info.bands.len(), "Resolved image metadata");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn band_names(&self, image: &str) -> EarthEngineResult<Vec<String>> {
        let names: Vec<String> = self.compute_value(&Expression::band_names(image)).await?;
        debug!(image = %image, bands = names.len(), "Resolved band names");
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn projection_at_scale(
        &self,
        crs: &str,
        scale: f64,
    ) -> EarthEngineResult<ProjectionInfo> {
        let projection: ProjectionInfo = self
            .compute_value(&Expression::projection_at_scale(crs, scale))
            .await?;
        debug!(
            crs = %projection.crs,
            transform = ?projection.transform,
            "Resolved projection"
        );
        Ok(projection)
    }

    #[instrument(skip(self, request), fields(format = %request.file_format))]
    async fn compute_pixels(&self, request: &ComputePixelsRequest) -> EarthEngineResult<Bytes> {
        let response = self.post("image:computePixels", request).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(EarthEngineError::invalid_response(
                "computePixels returned an empty body",
            ));
        }
        debug!(bytes = bytes.len(), "Received chip");
        Ok(bytes)
    }
}
