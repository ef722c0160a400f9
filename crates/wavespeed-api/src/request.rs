/// Request payloads
///
/// One payload struct per capability, gathered into a tagged
/// [`GenerationRequest`] so a payload can never be posted to the wrong
/// endpoint.
use crate::capability::Capability;
use serde::Serialize;

/// Prompt-driven image edit (Flux Kontext).
#[derive(Debug, Clone, Serialize)]
pub struct ImageEditRequest {
    /// Edit instruction.
    pub prompt: String,

    /// Publicly reachable source image URL (or data URL).
    pub image: String,

    /// Requested output format (`png`, `jpg`, `webp`).
    pub output_format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl ImageEditRequest {
    pub fn new(prompt: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: image.into(),
            output_format: "png".to_string(),
            guidance_scale: None,
            seed: None,
        }
    }
}

/// Precise single-step edit (SeedEdit).
#[derive(Debug, Clone, Serialize)]
pub struct SeedEditRequest {
    pub prompt: String,
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl SeedEditRequest {
    pub fn new(prompt: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: image.into(),
            guidance_scale: None,
            seed: None,
        }
    }
}

/// Image upscaling.
#[derive(Debug, Clone, Serialize)]
pub struct UpscaleRequest {
    pub image: String,

    /// Target resolution tier, e.g. `2k`, `4k`, `8k`.
    pub target_resolution: String,

    pub output_format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity: Option<i32>,
}

impl UpscaleRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            target_resolution: "4k".to_string(),
            output_format: "png".to_string(),
            creativity: None,
        }
    }
}

/// Image-to-video animation (WAN).
#[derive(Debug, Clone, Serialize)]
pub struct ImageToVideoRequest {
    pub prompt: String,
    pub image: String,

    /// Clip length in seconds.
    pub duration: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl ImageToVideoRequest {
    pub fn new(prompt: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: image.into(),
            duration: 5,
            seed: None,
        }
    }
}

/// Image-to-video animation (SeedDance).
#[derive(Debug, Clone, Serialize)]
pub struct SeedDanceRequest {
    pub prompt: String,
    pub image: String,

    /// Clip length in seconds.
    pub duration: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_fixed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl SeedDanceRequest {
    pub fn new(prompt: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: image.into(),
            duration: 5,
            camera_fixed: None,
            seed: None,
        }
    }
}

/// A capability paired with its request payload.
///
/// Serializes untagged, i.e. as the bare payload object the endpoint
/// expects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerationRequest {
    ImageEdit(ImageEditRequest),
    SeedEdit(SeedEditRequest),
    Upscale(UpscaleRequest),
    ImageToVideo(ImageToVideoRequest),
    SeedDance(SeedDanceRequest),
}

impl GenerationRequest {
    pub fn capability(&self) -> Capability {
        match self {
            Self::ImageEdit(_) => Capability::ImageEdit,
            Self::SeedEdit(_) => Capability::SeedEdit,
            Self::Upscale(_) => Capability::Upscale,
            Self::ImageToVideo(_) => Capability::ImageToVideo,
            Self::SeedDance(_) => Capability::SeedDance,
        }
    }

    /// Prompt text, empty for capabilities without one.
    pub fn prompt(&self) -> &str {
        match self {
            Self::ImageEdit(r) => &r.prompt,
            Self::SeedEdit(r) => &r.prompt,
            Self::Upscale(_) => "",
            Self::ImageToVideo(r) => &r.prompt,
            Self::SeedDance(r) => &r.prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_edit_serialization() {
        let request = ImageEditRequest::new("make it rain", "https://example.com/cat.png");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["prompt"], "make it rain");
        assert_eq!(json["image"], "https://example.com/cat.png");
        assert_eq!(json["output_format"], "png");
        assert!(json.get("guidance_scale").is_none());
    }

    #[test]
    fn test_generation_request_serializes_untagged() {
        let request =
            GenerationRequest::Upscale(UpscaleRequest::new("https://example.com/small.png"));
        let json = serde_json::to_value(&request).unwrap();

        // No enum tag, just the payload object.
        assert_eq!(json["target_resolution"], "4k");
        assert!(json.get("Upscale").is_none());
    }

    #[test]
    fn test_capability_mapping() {
        let request = GenerationRequest::SeedDance(SeedDanceRequest::new("dance", "img"));
        assert_eq!(request.capability(), Capability::SeedDance);
        assert_eq!(request.prompt(), "dance");

        let request = GenerationRequest::Upscale(UpscaleRequest::new("img"));
        assert_eq!(request.capability(), Capability::Upscale);
        assert_eq!(request.prompt(), "");
    }
}
