/// Remote generation capabilities
///
/// Each capability is one WaveSpeed endpoint. The variant carries
/// everything that used to be looked up by string key: endpoint path,
/// polling cadence, output kind and results subfolder.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One of the remote generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Prompt-driven image editing (Flux Kontext).
    ImageEdit,
    /// Precise single-step image editing (SeedEdit).
    SeedEdit,
    /// Image upscaling.
    Upscale,
    /// Image-to-video animation (WAN).
    ImageToVideo,
    /// Image-to-video animation (SeedDance).
    SeedDance,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ImageEdit,
        Capability::SeedEdit,
        Capability::Upscale,
        Capability::ImageToVideo,
        Capability::SeedDance,
    ];

    /// Submission path relative to the API base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Self::ImageEdit => "wavespeed-ai/flux-kontext-dev",
            Self::SeedEdit => "bytedance/seededit-v3",
            Self::Upscale => "wavespeed-ai/image-upscaler",
            Self::ImageToVideo => "wavespeed-ai/wan-2.1/i2v-480p",
            Self::SeedDance => "bytedance/seedance-v1-pro-i2v-480p",
        }
    }

    /// Static polling interval for this capability. Video jobs are slow
    /// enough that 2s polling is plenty; SeedEdit usually returns in a
    /// few seconds so it polls faster.
    pub fn poll_interval(&self) -> Duration {
        match self {
            Self::SeedEdit => Duration::from_millis(500),
            Self::ImageToVideo | Self::SeedDance => Duration::from_secs(2),
            Self::ImageEdit | Self::Upscale => Duration::from_secs(1),
        }
    }

    /// Whether this capability produces a video asset.
    pub fn is_video(&self) -> bool {
        matches!(self, Self::ImageToVideo | Self::SeedDance)
    }

    /// Subdirectory under the results root where outputs are saved.
    pub fn results_subfolder(&self) -> &'static str {
        match self {
            Self::ImageEdit => "Image_Edits",
            Self::SeedEdit => "SeedEdit_Results",
            Self::Upscale => "Upscaled_Images",
            Self::ImageToVideo => "Generated_Videos",
            Self::SeedDance => "SeedDance_Videos",
        }
    }

    /// Snake_case label used in filenames and metadata records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ImageEdit => "image_edit",
            Self::SeedEdit => "seededit",
            Self::Upscale => "upscale",
            Self::ImageToVideo => "image_to_video",
            Self::SeedDance => "seeddance",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
