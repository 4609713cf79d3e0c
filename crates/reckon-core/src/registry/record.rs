//! Job record: one plan node plus its dispatch metadata.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::JobStatus;
use crate::calc::Operator;
use crate::domain::{BinaryJob, JobId, TaskId};

/// Operand slot of a job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Slot {
    Ready(f64),
    /// Filled when the child job feeding it reports.
    Waiting,
}

/// Which operand of the parent a job feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Lhs,
    Rhs,
}

/// Design:
/// - Jobs are keyed by `JobId`; `seq` gives the dispatch order (oldest first).
/// - `parent` links a job to the operand slot its value fills.
/// - Only a job with both slots `Ready` is ever handed to a worker.
#[derive(Debug, Clone)]
pub(crate) struct JobRecord {
    pub id: JobId,
    pub task_id: TaskId,
    pub seq: u64,
    pub operator: Operator,
    pub lhs: Slot,
    pub rhs: Slot,
    pub parent: Option<(JobId, Side)>,
    pub status: JobStatus,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(
        id: JobId,
        task_id: TaskId,
        seq: u64,
        operator: Operator,
        lhs: Slot,
        rhs: Slot,
    ) -> Self {
        Self {
            id,
            task_id,
            seq,
            operator,
            lhs,
            rhs,
            parent: None,
            status: JobStatus::Pending,
            claimed_at: None,
        }
    }

    pub fn operands(&self) -> Option<(f64, f64)> {
        match (self.lhs, self.rhs) {
            (Slot::Ready(a), Slot::Ready(b)) => Some((a, b)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.operands().is_some()
    }

    /// Can a worker be given this job right now?
    pub fn is_dispatchable(&self, now: DateTime<Utc>, claim_timeout: Duration) -> bool {
        if !self.is_ready() {
            return false;
        }
        match self.status {
            JobStatus::Pending => true,
            JobStatus::Claimed => self.lease_expired(now, claim_timeout),
        }
    }

    fn lease_expired(&self, now: DateTime<Utc>, claim_timeout: Duration) -> bool {
        let Some(claimed_at) = self.claimed_at else {
            return true;
        };
        match chrono::Duration::from_std(claim_timeout) {
            Ok(timeout) => claimed_at + timeout <= now,
            Err(_) => false,
        }
    }

    pub fn claim(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Claimed;
        self.claimed_at = Some(now);
    }

    pub fn fill(&mut self, side: Side, value: f64) {
        match side {
            Side::Lhs => self.lhs = Slot::Ready(value),
            Side::Rhs => self.rhs = Slot::Ready(value),
        }
    }

    /// Wire form for a worker. `None` while an operand is still missing.
    pub fn to_job(&self) -> Option<BinaryJob> {
        let (arg1, arg2) = self.operands()?;
        Some(BinaryJob {
            id: self.id.clone(),
            arg1,
            arg2,
            operation: self.operator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(lhs: Slot, rhs: Slot) -> JobRecord {
        JobRecord::new(
            JobId::new("job_1"),
            TaskId::new("expr_1"),
            1,
            Operator::Add,
            lhs,
            rhs,
        )
    }

    #[test]
    fn waiting_job_is_not_dispatchable() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut job = record(Slot::Ready(1.0), Slot::Waiting);
        assert!(!job.is_dispatchable(now, Duration::from_secs(1)));
        assert!(job.to_job().is_none());

        job.fill(Side::Rhs, 2.0);
        assert!(job.is_dispatchable(now, Duration::from_secs(1)));
        assert_eq!(job.to_job().unwrap().arg2, 2.0);
    }

    #[test]
    fn claimed_job_is_dispatchable_again_after_lease() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut job = record(Slot::Ready(1.0), Slot::Ready(2.0));
        job.claim(now);

        let timeout = Duration::from_secs(30);
        assert!(!job.is_dispatchable(now, timeout));
        assert!(!job.is_dispatchable(now + chrono::Duration::seconds(29), timeout));
        assert!(job.is_dispatchable(now + chrono::Duration::seconds(30), timeout));
    }
}
