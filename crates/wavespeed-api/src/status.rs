/// Task status mapping
use serde::{Deserialize, Serialize};

/// Lifecycle status of a remote generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Map the remote `status` field. Returns `None` for strings this
    /// client does not understand.
    pub fn from_remote(raw: &str) -> Option<Self> {
        match raw {
            "created" | "queued" | "pending" => Some(Self::Pending),
            "processing" | "running" => Some(Self::Processing),
            "completed" | "succeeded" => Some(Self::Completed),
            "failed" | "error" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One observation of a remote task.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub status: TaskStatus,

    /// Output asset URLs; populated once the task completes.
    pub outputs: Vec<String>,

    /// Remote error message for failed tasks.
    pub error: Option<String>,
}

impl StatusSnapshot {
    pub fn first_output(&self) -> Option<&str> {
        self.outputs.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_mapping() {
        assert_eq!(TaskStatus::from_remote("created"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::from_remote("queued"), Some(TaskStatus::Pending));
        assert_eq!(
            TaskStatus::from_remote("processing"),
            Some(TaskStatus::Processing)
        );
        assert_eq!(
            TaskStatus::from_remote("completed"),
            Some(TaskStatus::Completed)
        );
        assert_eq!(TaskStatus::from_remote("failed"), Some(TaskStatus::Failed));
        assert_eq!(TaskStatus::from_remote("exploded"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }
}
