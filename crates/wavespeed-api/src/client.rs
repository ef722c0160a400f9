/// HTTP task client
///
/// One POST to submit a generation request, one GET per status check.
/// No retries at this layer; a failure is returned to the caller as-is.
use crate::config::Config;
use crate::error::ApiError;
use crate::request::GenerationRequest;
use crate::status::{StatusSnapshot, TaskStatus};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Identifier assigned by the remote API on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of task status observations.
///
/// The poll loop runs against this trait so it can be exercised with a
/// scripted sequence instead of a live HTTP server.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot, ApiError>;
}

/// All responses arrive wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    status: String,
    #[serde(default)]
    outputs: Vec<String>,
    error: Option<String>,
}

/// Client for the WaveSpeed generation API.
pub struct WaveSpeedClient {
    config: Config,
    http: reqwest::Client,
}

impl WaveSpeedClient {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Build a client from `WAVESPEED_API_KEY` / `WAVESPEED_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit a generation request to its capability endpoint.
    ///
    /// Single POST, no retry. Returns the assigned request id on a
    /// well-formed 2xx response, otherwise the HTTP status and body
    /// text as an error.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<RequestId, ApiError> {
        let capability = request.capability();
        let url = format!("{}/{}", self.config.base_url, capability.endpoint_path());
        tracing::debug!(%capability, %url, "submitting generation request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, body });
        }

        let envelope: Envelope<SubmitData> = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        if envelope.data.id.is_empty() {
            return Err(ApiError::Malformed("empty request id".to_string()));
        }

        tracing::debug!(request_id = %envelope.data.id, "request accepted");
        Ok(RequestId(envelope.data.id))
    }

    /// Fetch the current status of a submitted request.
    pub async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot, ApiError> {
        let url = format!(
            "{}/predictions/{}/result",
            self.config.base_url, request_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, body });
        }

        let envelope: Envelope<ResultData> = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        let data = envelope.data;

        let task_status = TaskStatus::from_remote(&data.status)
            .ok_or_else(|| ApiError::Malformed(format!("unknown task status '{}'", data.status)))?;

        if task_status == TaskStatus::Completed && data.outputs.is_empty() {
            return Err(ApiError::Malformed(
                "completed task has no outputs".to_string(),
            ));
        }

        Ok(StatusSnapshot {
            status: task_status,
            outputs: data.outputs,
            error: data.error,
        })
    }
}

#[async_trait]
impl StatusSource for WaveSpeedClient {
    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot, ApiError> {
        WaveSpeedClient::fetch_status(self, request_id).await
    }
}
