//! Binary-operation jobs: what a worker receives and what it sends back.

use serde::{Deserialize, Serialize};

use super::JobId;
use crate::calc::{CalcError, Operator};

/// One operator and two operands, as handed to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryJob {
    pub id: JobId,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: Operator,
}

impl BinaryJob {
    /// Compute `arg1 <operation> arg2` with the evaluator's operator rules.
    pub fn compute(&self) -> Result<f64, CalcError> {
        self.operation.apply(self.arg1, self.arg2)
    }
}

/// Worker → coordinator report body.
///
/// Exactly one of `result` / `error` is expected. A body with neither is
/// treated as a failure of the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub id: JobId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    /// Build the report for a finished computation.
    ///
    /// JSON has no encoding for ±∞/NaN, so a non-finite value is reported as
    /// an error instead of silently turning into `null`.
    pub fn from_computation(id: JobId, computed: Result<f64, CalcError>) -> Self {
        match computed {
            Ok(value) if value.is_finite() => Self {
                id,
                result: Some(value),
                error: None,
            },
            Ok(value) => Self {
                id,
                result: None,
                error: Some(format!("result is not a finite number: {value}")),
            },
            Err(err) => Self {
                id,
                result: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn outcome(&self) -> JobOutcome {
        match (&self.result, &self.error) {
            (_, Some(error)) => JobOutcome::Failed(error.clone()),
            (Some(value), None) => JobOutcome::Value(*value),
            (None, None) => JobOutcome::Failed("worker reported no result".to_string()),
        }
    }
}

/// What a report means for the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Value(f64),
    Failed(String),
}
