//! Client configuration.

use std::time::Duration;

use crate::error::{EarthEngineError, EarthEngineResult};

/// High-volume endpoint, meant for many small automated requests.
pub const HIGH_VOLUME_API_BASE_URL: &str = "https://earthengine-highvolume.googleapis.com";

const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for the Earth Engine REST API.
#[derive(Clone)]
pub struct EarthEngineConfig {
    /// Cloud project that requests are billed to.
    pub project: String,
    pub base_url: String,
    pub api_version: String,
    /// OAuth2 access token sent as a bearer token.
    pub access_token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            base_url: HIGH_VOLUME_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for EarthEngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthEngineConfig")
            .field("project", &self.project)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl EarthEngineConfig {
    /// Configuration for a project with everything else defaulted.
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `EE_PROJECT`, `EE_API_URL`, `EE_ACCESS_TOKEN` and
    /// `EE_TIMEOUT_SECS`; unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EE_PROJECT") {
            config.project = val;
        }

        if let Ok(val) = std::env::var("EE_API_URL") {
            config.base_url = val;
        }

        if let Ok(val) = std::env::var("EE_ACCESS_TOKEN") {
            if !val.trim().is_empty() {
                config.access_token = Some(val.trim().to_string());
            }
        }

        if let Ok(val) = std::env::var("EE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> EarthEngineResult<()> {
        if self.project.trim().is_empty() {
            return Err(EarthEngineError::config("project must be set (EE_PROJECT)"));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EarthEngineError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }

        if self.api_version.trim().is_empty() {
            return Err(EarthEngineError::config("api_version must not be empty"));
        }

        if self.access_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(EarthEngineError::config(
                "access token must be set (EE_ACCESS_TOKEN)",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(EarthEngineError::config("request_timeout must be > 0"));
        }

        Ok(())
    }

    /// `{base}/{version}/projects/{project}/{method}`
    pub fn project_url(&self, method: &str) -> String {
        format!(
            "{}/{}/projects/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            self.project,
            method
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> EarthEngineConfig {
        EarthEngineConfig::for_project("pc511-gambia-training").with_access_token("ya29.token")
    }

    #[test]
    fn test_defaults() {
        let config = EarthEngineConfig::default();
        assert_eq!(config.base_url, HIGH_VOLUME_API_BASE_URL);
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.request_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        assert!(EarthEngineConfig::default()
            .with_access_token("t")
            .validate()
            .is_err());

        let mut no_token = valid();
        no_token.access_token = None;
        assert!(no_token.validate().is_err());

        assert!(valid().with_base_url("earthengine.googleapis.com").validate().is_err());

        let mut zero_timeout = valid();
        zero_timeout.request_timeout = Duration::ZERO;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_project_url() {
        let config = valid().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            config.project_url("image:computePixels"),
            "http://127.0.0.1:8080/v1/projects/pc511-gambia-training/image:computePixels"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("ya29"));
        assert!(rendered.contains("<redacted>"));
    }
}
