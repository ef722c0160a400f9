/// Client configuration
use crate::error::ApiError;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai/api/v3";

/// Per-request timeout for submission and status calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// WaveSpeed client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Create a config with the default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `WAVESPEED_API_KEY` is required; `WAVESPEED_BASE_URL` overrides
    /// the default endpoint.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var("WAVESPEED_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("WAVESPEED_BASE_URL") {
            config.base_url = url;
        }
        Ok(config)
    }

    /// With a custom base URL (used by tests against a mock server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With a custom per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
