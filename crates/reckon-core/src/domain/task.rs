use serde::{Deserialize, Serialize};

use super::TaskId;

/// Task status.
///
/// State transitions:
/// - Pending -> Completed
///
/// There is no failure state: an expression that fails while running
/// completes with an `"Error: ..."` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// A client-visible unit of asynchronous work (one submitted expression).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,

    /// Present iff `status == Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Source text as submitted. Empty for tasks created without one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expression: String,
}

impl Task {
    pub fn pending(id: TaskId, expression: impl Into<String>) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            result: None,
            expression: expression.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub(crate) fn complete(&mut self, result: String) {
        self.status = TaskStatus::Completed;
        self.result = Some(result);
    }
}
