/// Result materializer
///
/// Downloads a completed task's output asset and writes it, plus a
/// sidecar metadata record, under the results directory. The asset
/// write is atomic: either the full file lands or nothing does.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use wavespeed_api::Capability;

pub mod naming;

pub use naming::{build_filename, sanitize_component};

/// Default results directory, relative to the working directory.
pub const RESULTS_ROOT: &str = "WaveSpeed_Results";

/// Timeout for the single blocking download GET.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// File format of a saved output asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpg,
    Webp,
    Mp4,
}

impl OutputFormat {
    /// Format used when the caller does not pick one: MP4 for video
    /// capabilities, PNG otherwise.
    pub fn default_for(capability: Capability) -> Self {
        if capability.is_video() {
            Self::Mp4
        } else {
            Self::Png
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
            Self::Mp4 => "mp4",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "webp" => Ok(Self::Webp),
            "mp4" => Ok(Self::Mp4),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("download failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("download failed: HTTP {status}")]
    Http { status: reqwest::StatusCode },

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("metadata encoding failed: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Sidecar record written next to every saved asset. The only
/// persisted provenance for a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub timestamp: DateTime<Utc>,
    pub ai_model: String,
    pub result_url: String,
    pub prompt: String,
    pub extra_info: String,
    pub file_path: PathBuf,
}

/// A materialized result on disk.
#[derive(Debug, Clone)]
pub struct SavedArtifact {
    pub file_path: PathBuf,
    pub sidecar_path: PathBuf,
    pub metadata: ArtifactMetadata,
}

/// What to download and how to name it.
#[derive(Debug, Clone)]
pub struct SaveRequest<'a> {
    pub capability: Capability,
    pub output_url: &'a str,
    pub prompt: &'a str,
    pub extra_info: &'a str,
    pub format: OutputFormat,
}

/// Downloads completed outputs and writes them under the results root.
pub struct Materializer {
    root: PathBuf,
    http: reqwest::Client,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self {
            root: root.into(),
            http,
        })
    }

    pub fn results_root(&self) -> &Path {
        &self.root
    }

    /// Download `output_url` and persist it with a sidecar metadata
    /// record. On any failure no partial file is left behind.
    ///
    /// Two calls with identical inputs in different seconds produce two
    /// distinct files; that is intentional.
    pub async fn save(&self, request: &SaveRequest<'_>) -> Result<SavedArtifact, SaveError> {
        let bytes = self.download(request.output_url).await?;

        let now = Utc::now();
        let dir = self.root.join(request.capability.results_subfolder());
        std::fs::create_dir_all(&dir)?;

        let filename = build_filename(
            request.capability,
            now,
            request.prompt,
            request.extra_info,
            request.format,
        );
        let path = dir.join(&filename);

        write_atomic(&path, &bytes)?;

        let metadata = ArtifactMetadata {
            timestamp: now,
            ai_model: request.capability.label().to_string(),
            result_url: request.output_url.to_string(),
            prompt: request.prompt.to_string(),
            extra_info: request.extra_info.to_string(),
            file_path: path.clone(),
        };

        let sidecar_path = path.with_extension("json");
        std::fs::write(&sidecar_path, serde_json::to_string_pretty(&metadata)?)?;

        tracing::info!(path = %path.display(), "saved result");
        Ok(SavedArtifact {
            file_path: path,
            sidecar_path,
            metadata,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SaveError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::Http { status });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Write via a `.part` sibling and rename, so a failed write never
/// leaves a partial asset at the final path.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    if let Err(e) = std::fs::write(&part, bytes) {
        let _ = std::fs::remove_file(&part);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&part, path) {
        let _ = std::fs::remove_file(&part);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_all_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files
    }

    #[test]
    fn test_default_formats() {
        assert_eq!(
            OutputFormat::default_for(Capability::ImageEdit),
            OutputFormat::Png
        );
        assert_eq!(
            OutputFormat::default_for(Capability::SeedDance),
            OutputFormat::Mp4
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!("tiff".parse::<OutputFormat>().is_err());
    }

    #[tokio::test]
    async fn test_save_writes_asset_and_sidecar() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/out.png")
            .with_status(200)
            .with_body(b"fake png bytes".to_vec())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let url = format!("{}/out.png", server.url());

        let artifact = materializer
            .save(&SaveRequest {
                capability: Capability::ImageEdit,
                output_url: &url,
                prompt: "a red balloon",
                extra_info: "",
                format: OutputFormat::Png,
            })
            .await
            .unwrap();

        assert!(artifact.file_path.starts_with(dir.path().join("Image_Edits")));
        assert_eq!(
            std::fs::read(&artifact.file_path).unwrap(),
            b"fake png bytes"
        );
        assert!(artifact.sidecar_path.exists());
        assert_eq!(artifact.metadata.ai_model, "image_edit");

        // No .part leftovers.
        assert!(list_all_files(dir.path())
            .iter()
            .all(|p| p.extension().map(|e| e != "part").unwrap_or(true)));
    }

    #[tokio::test]
    async fn test_sidecar_has_exactly_the_provenance_keys() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/out.png")
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let url = format!("{}/out.png", server.url());

        let artifact = materializer
            .save(&SaveRequest {
                capability: Capability::Upscale,
                output_url: &url,
                prompt: "",
                extra_info: "4k",
                format: OutputFormat::Png,
            })
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&artifact.sidecar_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: std::collections::BTreeSet<_> =
            value.as_object().unwrap().keys().cloned().collect();
        let expected: std::collections::BTreeSet<_> = [
            "timestamp",
            "ai_model",
            "result_url",
            "prompt",
            "extra_info",
            "file_path",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(keys, expected);

        // Round-trips through serde.
        let parsed: ArtifactMetadata = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, artifact.metadata);
    }

    #[tokio::test]
    async fn test_failed_download_leaves_directory_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.png")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let url = format!("{}/missing.png", server.url());

        let err = materializer
            .save(&SaveRequest {
                capability: Capability::ImageEdit,
                output_url: &url,
                prompt: "never saved",
                extra_info: "",
                format: OutputFormat::Png,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::Http { status } if status.as_u16() == 404));
        assert!(list_all_files(dir.path()).is_empty());
    }
}
