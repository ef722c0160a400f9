/// In-memory task record
use chrono::{DateTime, Utc};
use wavespeed_api::{Capability, RequestId, TaskStatus};

/// One remote generation request, tracked only for the duration of its
/// poll loop. Dropped once a terminal state has been handled; tasks are
/// never persisted.
#[derive(Debug, Clone)]
pub struct Task {
    pub request_id: RequestId,
    pub capability: Capability,
    pub submitted_at: DateTime<Utc>,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(request_id: RequestId, capability: Capability) -> Self {
        Self {
            request_id,
            capability,
            submitted_at: Utc::now(),
            status: TaskStatus::Pending,
        }
    }

    /// Record a status observation from polling. Status only ever moves
    /// through polling; nothing else mutates a task.
    pub fn observe(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
