//! Task registry: tasks, their jobs, and the claim/report exchange.

mod memory;
mod record;
mod state;

pub use memory::TaskRegistry;
pub use state::{ClaimMode, JobStatus};

use thiserror::Error;

use crate::domain::TaskId;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task id already exists: {0}")]
    DuplicateId(TaskId),

    #[error("task not found: {0}")]
    UnknownTask(TaskId),

    #[error("task already completed: {0}")]
    TaskCompleted(TaskId),
}

/// What a job report did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEffect {
    /// Unknown job, already reported, or not yet runnable.
    Ignored,

    /// The value was handed to the parent job.
    Progressed { task_id: TaskId },

    /// The task now has its final result (value or `"Error: ..."`).
    TaskCompleted { task_id: TaskId, result: String },
}
