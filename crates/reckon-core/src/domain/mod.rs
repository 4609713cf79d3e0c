//! Domain model: ids, tasks and binary-operation jobs.

pub mod ids;
pub mod job;
pub mod task;

pub use ids::{IdMarker, JobId, TaskId};
pub use job::{BinaryJob, JobOutcome, JobReport};
pub use task::{Task, TaskStatus};
