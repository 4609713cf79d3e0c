//! Job state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job status inside the registry.
///
/// State transitions:
/// - Pending -> Claimed (exclusive claim)
/// - Claimed -> Claimed (lease expired, handed to another worker)
/// - Pending | Claimed -> removed (reported)
///
/// A reported job leaves the registry; only its task remains visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Claimed,
}

/// How `claim_job` hands out work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimMode {
    /// Atomic pending -> claimed transition; a job goes to one worker at a
    /// time until its lease expires.
    #[default]
    Exclusive,

    /// Read-only selection. Workers polling concurrently can receive the same
    /// job and compute it twice; the first report wins.
    Shared,
}

impl fmt::Display for ClaimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimMode::Exclusive => f.write_str("exclusive"),
            ClaimMode::Shared => f.write_str("shared"),
        }
    }
}

impl FromStr for ClaimMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclusive" => Ok(ClaimMode::Exclusive),
            "shared" => Ok(ClaimMode::Shared),
            other => Err(format!("unknown claim mode {other:?} (expected exclusive|shared)")),
        }
    }
}
