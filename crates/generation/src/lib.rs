/// Generation task lifecycle
///
/// Submit a request, poll it to a terminal state, materialize the
/// result. One task per call; concurrent tasks are fully independent.
use artifacts::SaveError;
use std::time::Duration;
use thiserror::Error;
use wavespeed_api::ApiError;

pub mod poll;
pub mod service;
pub mod task;

pub use poll::{poll_until_complete, PollOptions, PollOutcome, DEFAULT_POLL_TIMEOUT};
pub use service::{GenerationOutcome, GenerationService, SavePolicy};
pub use task::Task;

/// Terminal failure of a generation task. Exactly one of an output URL
/// or one of these is produced per task, never both.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Submission or status fetch failed. The poll loop aborts on the
    /// first fetch error rather than retrying (fail-fast).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The remote task reached `failed`, with its error message.
    #[error("remote task failed: {0}")]
    TaskFailed(String),

    /// No terminal state within the configured poll timeout.
    #[error("timed out after {}s waiting for completion", elapsed.as_secs())]
    Timeout { elapsed: Duration },

    /// The task completed but the download or save failed. The result
    /// URL is still known to the caller.
    #[error("result ready at {output_url} but saving failed: {source}")]
    Save {
        output_url: String,
        #[source]
        source: SaveError,
    },
}
