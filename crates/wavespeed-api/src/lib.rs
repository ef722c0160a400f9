/// WaveSpeed API client
///
/// Typed HTTP client for the WaveSpeed generation endpoints: capability
/// definitions, request payloads, task submission and status polling.
pub mod capability;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod status;

pub use capability::Capability;
pub use client::{RequestId, StatusSource, WaveSpeedClient};
pub use config::Config;
pub use error::ApiError;
pub use request::{
    GenerationRequest, ImageEditRequest, ImageToVideoRequest, SeedDanceRequest, SeedEditRequest,
    UpscaleRequest,
};
pub use status::{StatusSnapshot, TaskStatus};
