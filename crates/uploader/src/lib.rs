/// Privacy uploader
///
/// The remote generation API needs a publicly reachable image URL.
/// This crate turns a local file into one: host it externally (imgbb)
/// or fall back to an inline base64 data URL.
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

pub const IMGBB_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Images above this size get re-encoded when compression is enabled.
const COMPRESSION_THRESHOLD_BYTES: usize = 1_000_000;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("hosting service error: {status} - {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image re-encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("no upload route available: hosting unconfigured or failed and base64 fallback is disabled")]
    NoUploadRoute,
}

/// External image hosting service.
#[async_trait]
pub trait ImageHost: Send + Sync {
    fn name(&self) -> &str;

    /// Upload the image bytes and return a publicly reachable URL.
    async fn host_image(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError>;
}

/// imgbb.com hosting backend.
pub struct ImgbbHost {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    data: ImgbbData,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
}

impl ImgbbHost {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: IMGBB_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from `IMGBB_API_KEY`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("IMGBB_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(Self::new)
    }

    /// With a custom endpoint (used by tests against a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    fn name(&self) -> &str {
        "imgbb"
    }

    async fn host_image(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let params = [
            ("key", self.api_key.as_str()),
            ("image", encoded.as_str()),
            ("name", filename),
        ];

        let response = self.client.post(&self.endpoint).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Http { status, body });
        }

        let parsed: ImgbbResponse = response.json().await?;
        Ok(parsed.data.url)
    }
}

/// Behavior toggles for [`SecureUploader`].
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Inline the image as a base64 data URL when hosting is not an
    /// option. Disabled by `DISABLE_BASE64_FALLBACK`.
    pub allow_base64_fallback: bool,

    /// Re-encode large images as JPEG before uploading. Enabled by
    /// `ENABLE_IMAGE_COMPRESSION`.
    pub compress_images: bool,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            allow_base64_fallback: true,
            compress_images: false,
        }
    }
}

impl UploaderConfig {
    pub fn from_env() -> Self {
        Self {
            allow_base64_fallback: !env_flag("DISABLE_BASE64_FALLBACK"),
            compress_images: env_flag("ENABLE_IMAGE_COMPRESSION"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Resolves any image reference into a URL the remote API can fetch.
pub struct SecureUploader {
    host: Option<Box<dyn ImageHost>>,
    config: UploaderConfig,
}

impl SecureUploader {
    pub fn new(host: Option<Box<dyn ImageHost>>, config: UploaderConfig) -> Self {
        Self { host, config }
    }

    /// Build from `IMGBB_API_KEY`, `DISABLE_BASE64_FALLBACK` and
    /// `ENABLE_IMAGE_COMPRESSION`.
    pub fn from_env() -> Self {
        let host = ImgbbHost::from_env().map(|h| Box::new(h) as Box<dyn ImageHost>);
        Self::new(host, UploaderConfig::from_env())
    }

    /// Pass URLs through untouched; read local files and host them,
    /// falling back to a data URL if hosting is unavailable.
    pub async fn ensure_public_url(&self, source: &str) -> Result<String, UploadError> {
        if source.starts_with("http://")
            || source.starts_with("https://")
            || source.starts_with("data:")
        {
            return Ok(source.to_string());
        }

        let path = Path::new(source);
        let mut bytes = std::fs::read(path)?;
        let mut mime = mime_for(path);

        if self.config.compress_images && bytes.len() > COMPRESSION_THRESHOLD_BYTES {
            match reencode_jpeg(&bytes) {
                Ok(compressed) if compressed.len() < bytes.len() => {
                    tracing::debug!(
                        from = bytes.len(),
                        to = compressed.len(),
                        "compressed image before upload"
                    );
                    bytes = compressed;
                    mime = "image/jpeg";
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "image compression failed, uploading original");
                }
            }
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");

        if let Some(host) = &self.host {
            match host.host_image(&bytes, filename).await {
                Ok(url) => return Ok(url),
                Err(err) => {
                    tracing::warn!(host = host.name(), error = %err, "image hosting failed");
                }
            }
        }

        if self.config.allow_base64_fallback {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            return Ok(format!("data:{mime};base64,{encoded}"));
        }

        Err(UploadError::NoUploadRoute)
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Decode and re-encode as JPEG. Alpha is dropped; JPEG cannot carry it.
fn reencode_jpeg(bytes: &[u8]) -> Result<Vec<u8>, UploadError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)?;
    Ok(out)
}
