/// Generation service
///
/// Owns the submit -> poll -> materialize lifecycle for one request.
/// Explicitly constructed with its collaborators; there are no global
/// singletons.
use crate::poll::{poll_until_complete, PollOptions, PollOutcome};
use crate::GenerationError;
use artifacts::{Materializer, OutputFormat, SaveRequest, SavedArtifact};
use std::time::Duration;
use wavespeed_api::{GenerationRequest, RequestId, TaskStatus, WaveSpeedClient};

/// Whether and how to persist the completed output.
#[derive(Debug, Clone)]
pub enum SavePolicy {
    /// Download the output and write it under the results root.
    /// `format: None` picks the capability default (MP4 for video, PNG
    /// otherwise); `extra_info` lands in the filename and sidecar.
    Save {
        format: Option<OutputFormat>,
        extra_info: String,
    },
    /// Return the output URL without materializing it.
    Skip,
}

impl SavePolicy {
    pub fn save() -> Self {
        Self::Save {
            format: None,
            extra_info: String::new(),
        }
    }
}

/// The end state of a successful generation.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub request_id: RequestId,
    pub output_url: String,
    pub artifact: Option<SavedArtifact>,
    pub elapsed: Duration,
}

/// Drives one generation task from submission to a handled terminal
/// state.
pub struct GenerationService {
    client: WaveSpeedClient,
    materializer: Materializer,
}

impl GenerationService {
    pub fn new(client: WaveSpeedClient, materializer: Materializer) -> Self {
        Self {
            client,
            materializer,
        }
    }

    pub fn client(&self) -> &WaveSpeedClient {
        &self.client
    }

    /// Run a request to completion: submit, poll, then save per
    /// `policy`. `on_progress` receives every non-terminal status
    /// observation.
    ///
    /// Errors are terminal for the task; nothing here retries. If the
    /// task completed but saving failed, the error still carries the
    /// output URL.
    pub async fn run<F>(
        &self,
        request: &GenerationRequest,
        opts: PollOptions,
        policy: SavePolicy,
        on_progress: F,
    ) -> Result<GenerationOutcome, GenerationError>
    where
        F: FnMut(TaskStatus),
    {
        let capability = request.capability();
        tracing::info!(%capability, "starting generation");

        let request_id = self.client.submit(request).await?;
        let PollOutcome {
            output_url,
            elapsed,
        } = poll_until_complete(&self.client, &request_id, opts, on_progress).await?;

        let artifact = match policy {
            SavePolicy::Skip => None,
            SavePolicy::Save { format, extra_info } => {
                let format = format.unwrap_or_else(|| OutputFormat::default_for(capability));
                let saved = self
                    .materializer
                    .save(&SaveRequest {
                        capability,
                        output_url: &output_url,
                        prompt: request.prompt(),
                        extra_info: &extra_info,
                        format,
                    })
                    .await
                    .map_err(|source| GenerationError::Save {
                        output_url: output_url.clone(),
                        source,
                    })?;
                Some(saved)
            }
        };

        Ok(GenerationOutcome {
            request_id,
            output_url,
            artifact,
            elapsed,
        })
    }
}
