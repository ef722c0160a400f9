/// Status poll loop
///
/// Fixed-interval polling until a terminal state or the hard timeout.
/// A fetch error aborts the loop immediately; retrying is the caller's
/// decision, and today nobody retries.
use crate::GenerationError;
use std::time::Duration;
use tokio::time::Instant;
use wavespeed_api::{Capability, RequestId, StatusSource, TaskStatus};

/// Hard ceiling on how long a task is polled.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Interval and timeout for one poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollOptions {
    /// Static per-capability interval with the default timeout. Not
    /// adaptive backoff; video capabilities simply poll slower.
    pub fn for_capability(capability: Capability) -> Self {
        Self {
            interval: capability.poll_interval(),
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Successful completion of a poll loop.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub output_url: String,
    pub elapsed: Duration,
}

/// Poll `request_id` until it completes, fails, or times out.
///
/// `on_progress` is invoked once per non-terminal observation, before
/// the loop sleeps. On `Completed` the first output URL is returned
/// with the elapsed time; on `Failed` the remote error message becomes
/// [`GenerationError::TaskFailed`].
pub async fn poll_until_complete<S, F>(
    source: &S,
    request_id: &RequestId,
    opts: PollOptions,
    mut on_progress: F,
) -> Result<PollOutcome, GenerationError>
where
    S: StatusSource + ?Sized,
    F: FnMut(TaskStatus),
{
    let started = Instant::now();

    loop {
        let snapshot = source.fetch_status(request_id).await?;

        match snapshot.status {
            TaskStatus::Completed => {
                let output_url = snapshot
                    .first_output()
                    .ok_or_else(|| {
                        wavespeed_api::ApiError::Malformed(
                            "completed task has no outputs".to_string(),
                        )
                    })?
                    .to_string();
                let elapsed = started.elapsed();
                tracing::info!(%request_id, secs = elapsed.as_secs_f64(), "task completed");
                return Ok(PollOutcome {
                    output_url,
                    elapsed,
                });
            }
            TaskStatus::Failed => {
                let message = snapshot
                    .error
                    .unwrap_or_else(|| "task failed with no error message".to_string());
                tracing::warn!(%request_id, %message, "task failed");
                return Err(GenerationError::TaskFailed(message));
            }
            status => {
                on_progress(status);
                let elapsed = started.elapsed();
                if elapsed >= opts.timeout {
                    tracing::warn!(%request_id, secs = elapsed.as_secs_f64(), "poll timeout");
                    return Err(GenerationError::Timeout { elapsed });
                }
                tokio::time::sleep(opts.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wavespeed_api::{ApiError, StatusSnapshot};

    /// Plays back a fixed sequence of fetch results.
    struct ScriptedSource {
        steps: Mutex<VecDeque<Result<StatusSnapshot, ApiError>>>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Result<StatusSnapshot, ApiError>>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
            }
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, _id: &RequestId) -> Result<StatusSnapshot, ApiError> {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    /// Never reaches a terminal state.
    struct AlwaysPending;

    #[async_trait]
    impl StatusSource for AlwaysPending {
        async fn fetch_status(&self, _id: &RequestId) -> Result<StatusSnapshot, ApiError> {
            Ok(snapshot(TaskStatus::Pending))
        }
    }

    fn snapshot(status: TaskStatus) -> StatusSnapshot {
        StatusSnapshot {
            status,
            outputs: Vec::new(),
            error: None,
        }
    }

    fn completed(url: &str) -> StatusSnapshot {
        StatusSnapshot {
            status: TaskStatus::Completed,
            outputs: vec![url.to_string()],
            error: None,
        }
    }

    fn opts(interval_secs: u64, timeout_secs: u64) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_callback_fires_per_nonterminal_observation() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(TaskStatus::Pending)),
            Ok(snapshot(TaskStatus::Processing)),
            Ok(snapshot(TaskStatus::Processing)),
            Ok(completed("https://cdn.example.com/out.png")),
        ]);

        let mut progress_calls = 0;
        let outcome = poll_until_complete(&source, &RequestId::new("req-1"), opts(1, 300), |_| {
            progress_calls += 1;
        })
        .await
        .unwrap();

        assert_eq!(progress_calls, 3);
        assert_eq!(outcome.output_url, "https://cdn.example.com/out.png");
        assert!(outcome.elapsed >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_terminal_times_out() {
        let err = poll_until_complete(&AlwaysPending, &RequestId::new("req-1"), opts(1, 300), |_| {})
            .await
            .unwrap_err();

        match err {
            GenerationError::Timeout { elapsed } => {
                assert!(elapsed >= Duration::from_secs(300));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_surfaces_message() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(TaskStatus::Processing)),
            Ok(StatusSnapshot {
                status: TaskStatus::Failed,
                outputs: Vec::new(),
                error: Some("NSFW content detected".to_string()),
            }),
        ]);

        let err = poll_until_complete(&source, &RequestId::new("req-1"), opts(1, 300), |_| {})
            .await
            .unwrap_err();
        match err {
            GenerationError::TaskFailed(message) => {
                assert_eq!(message, "NSFW content detected");
            }
            other => panic!("expected TaskFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_aborts_immediately() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(TaskStatus::Pending)),
            Err(ApiError::Malformed("connection reset".to_string())),
            // Never reached; the loop is fail-fast.
            Ok(completed("https://cdn.example.com/out.png")),
        ]);

        let mut progress_calls = 0;
        let err = poll_until_complete(&source, &RequestId::new("req-1"), opts(1, 300), |_| {
            progress_calls += 1;
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GenerationError::Api(_)));
        assert_eq!(progress_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_completion_skips_progress() {
        let source = ScriptedSource::new(vec![Ok(completed("https://cdn.example.com/fast.png"))]);

        let mut progress_calls = 0;
        let outcome = poll_until_complete(&source, &RequestId::new("req-1"), opts(1, 300), |_| {
            progress_calls += 1;
        })
        .await
        .unwrap();

        assert_eq!(progress_calls, 0);
        assert!(outcome.elapsed < Duration::from_secs(1));
    }
}
