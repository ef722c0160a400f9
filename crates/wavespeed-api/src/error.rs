/// API error taxonomy
///
/// Every failure surfaces here at the call boundary; nothing is retried
/// automatically at this layer.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("WAVESPEED_API_KEY is not set")]
    MissingApiKey,

    /// Connection failures, DNS errors, request timeouts.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response, carrying the status and body text verbatim.
    #[error("API error: {status} - {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}
