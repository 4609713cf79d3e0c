use serde::{Deserialize, Serialize};

/// Registry snapshot for `GET /internal/status` and periodic logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub tasks_pending: usize,
    pub tasks_completed: usize,
    /// Jobs still waiting for a child job's value.
    pub jobs_waiting: usize,
    /// Jobs with both operands, not yet claimed.
    pub jobs_ready: usize,
    pub jobs_claimed: usize,
}
