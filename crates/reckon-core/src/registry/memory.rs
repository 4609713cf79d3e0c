//! In-memory task registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::record::{JobRecord, Side, Slot};
use super::{ClaimMode, JobStatus, RegistryError, ReportEffect};
use crate::calc::{format_result, Operand, Plan};
use crate::domain::{BinaryJob, JobId, JobOutcome, Task, TaskId};
use crate::observability::RegistryCounts;
use crate::ports::{Clock, SystemClock};

/// Registry state. Everything behind the one lock.
struct RegistryState {
    /// All tasks (single source of truth for client-visible state).
    tasks: HashMap<TaskId, Task>,

    /// Outstanding jobs. Reported jobs are removed.
    jobs: HashMap<JobId, JobRecord>,

    /// Next job sequence number; also the numeric part of the job id.
    next_job_seq: u64,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            jobs: HashMap::new(),
            next_job_seq: 1,
        }
    }

    fn allocate_job_id(&mut self) -> (JobId, u64) {
        let seq = self.next_job_seq;
        self.next_job_seq += 1;
        (JobId::with_prefix(seq), seq)
    }

    fn complete_task(&mut self, id: &TaskId, result: String) -> bool {
        match self.tasks.get_mut(id) {
            Some(task) => {
                task.complete(result);
                true
            }
            None => false,
        }
    }

    fn drop_jobs_of(&mut self, task_id: &TaskId) {
        self.jobs.retain(|_, job| &job.task_id != task_id);
    }

    fn counts(&self) -> RegistryCounts {
        let mut counts = RegistryCounts::default();
        for task in self.tasks.values() {
            if task.is_pending() {
                counts.tasks_pending += 1;
            } else {
                counts.tasks_completed += 1;
            }
        }
        for job in self.jobs.values() {
            match job.status {
                JobStatus::Claimed => counts.jobs_claimed += 1,
                JobStatus::Pending if job.is_ready() => counts.jobs_ready += 1,
                JobStatus::Pending => counts.jobs_waiting += 1,
            }
        }
        counts
    }
}

/// Coordinator-side store of tasks and their jobs.
///
/// Design:
/// - One `Mutex` guards tasks and jobs together, so a report that finishes a
///   job and completes its task is a single atomic step.
/// - Every operation holds the lock for its whole (bounded, in-memory) body
///   and never awaits anything else while holding it.
/// - Owned by the coordinator and shared as `Arc<TaskRegistry>`; there is no
///   global instance.
pub struct TaskRegistry {
    state: Mutex<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Registry whose claim timestamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState::new()),
            clock,
        }
    }

    /// Insert a pending task with no source expression.
    pub async fn create(&self, id: TaskId) -> Result<(), RegistryError> {
        self.create_with_expression(id, String::new()).await
    }

    /// Insert a pending task. An id that is already present is rejected; the
    /// existing task is left untouched.
    pub async fn create_with_expression(
        &self,
        id: TaskId,
        expression: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;
        if state.tasks.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        let task = Task::pending(id.clone(), expression);
        state.tasks.insert(id, task);
        Ok(())
    }

    /// Snapshot of every task, in no particular order.
    pub async fn list(&self) -> Vec<Task> {
        let state = self.state.lock().await;
        state.tasks.values().cloned().collect()
    }

    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        let state = self.state.lock().await;
        state.tasks.get(id).cloned()
    }

    /// Mark a task completed with `result`.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown. A second
    /// call on the same id overwrites the first result.
    pub async fn complete(&self, id: &TaskId, result: impl Into<String>) -> bool {
        let mut state = self.state.lock().await;
        state.complete_task(id, result.into())
    }

    /// Any one pending task. Does not claim it.
    pub async fn next_pending(&self) -> Option<Task> {
        let state = self.state.lock().await;
        state.tasks.values().find(|task| task.is_pending()).cloned()
    }

    /// Materialize a plan as jobs belonging to `task_id`.
    ///
    /// A plan without operators completes the task on the spot. Returns the
    /// number of jobs added.
    pub async fn enqueue_plan(&self, task_id: &TaskId, plan: &Plan) -> Result<usize, RegistryError> {
        let mut state = self.state.lock().await;
        match state.tasks.get(task_id) {
            None => return Err(RegistryError::UnknownTask(task_id.clone())),
            Some(task) if !task.is_pending() => {
                return Err(RegistryError::TaskCompleted(task_id.clone()));
            }
            Some(_) => {}
        }

        if let Some(value) = plan.immediate() {
            state.complete_task(task_id, format_result(value));
            return Ok(0);
        }

        let slot = |operand: Operand| match operand {
            Operand::Value(value) => Slot::Ready(value),
            Operand::Node(_) => Slot::Waiting,
        };

        let mut ids = Vec::with_capacity(plan.nodes().len());
        let mut records = Vec::with_capacity(plan.nodes().len());
        for node in plan.nodes() {
            let (id, seq) = state.allocate_job_id();
            ids.push(id.clone());
            records.push(JobRecord::new(
                id,
                task_id.clone(),
                seq,
                node.operator,
                slot(node.lhs),
                slot(node.rhs),
            ));
        }
        for (record, parent) in records.iter_mut().zip(plan.parents()) {
            record.parent = parent.map(|(index, is_lhs)| {
                let side = if is_lhs { Side::Lhs } else { Side::Rhs };
                (ids[index].clone(), side)
            });
        }

        let added = records.len();
        for record in records {
            state.jobs.insert(record.id.clone(), record);
        }
        Ok(added)
    }

    /// Hand out the oldest dispatchable job.
    ///
    /// `Exclusive` marks it claimed under the lock, so two callers never get
    /// the same job until `claim_timeout` has passed since the claim.
    /// `Shared` only reads.
    pub async fn claim_job(&self, mode: ClaimMode, claim_timeout: Duration) -> Option<BinaryJob> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        let id = state
            .jobs
            .values()
            .filter(|job| job.is_dispatchable(now, claim_timeout))
            .min_by_key(|job| job.seq)
            .map(|job| job.id.clone())?;

        let job = state.jobs.get_mut(&id)?;
        if mode == ClaimMode::Exclusive {
            job.claim(now);
        }
        job.to_job()
    }

    /// Apply a worker's report.
    ///
    /// - value for a non-root job: fills the parent's operand.
    /// - value for the root job: completes the task with the formatted value.
    /// - failure: completes the task with `"Error: <message>"` and drops the
    ///   task's remaining jobs.
    ///
    /// Reports for unknown (or already reported) jobs change nothing.
    pub async fn report_job(&self, job_id: &JobId, outcome: JobOutcome) -> ReportEffect {
        let mut state = self.state.lock().await;

        if !state.jobs.get(job_id).is_some_and(JobRecord::is_ready) {
            return ReportEffect::Ignored;
        }
        let Some(job) = state.jobs.remove(job_id) else {
            return ReportEffect::Ignored;
        };

        match outcome {
            JobOutcome::Value(value) => match job.parent {
                Some((parent_id, side)) => {
                    if let Some(parent) = state.jobs.get_mut(&parent_id) {
                        parent.fill(side, value);
                    }
                    ReportEffect::Progressed {
                        task_id: job.task_id,
                    }
                }
                None => {
                    let result = format_result(value);
                    state.complete_task(&job.task_id, result.clone());
                    ReportEffect::TaskCompleted {
                        task_id: job.task_id,
                        result,
                    }
                }
            },
            JobOutcome::Failed(message) => {
                state.drop_jobs_of(&job.task_id);
                let result = format!("Error: {message}");
                state.complete_task(&job.task_id, result.clone());
                ReportEffect::TaskCompleted {
                    task_id: job.task_id,
                    result,
                }
            }
        }
    }

    pub async fn counts(&self) -> RegistryCounts {
        let state = self.state.lock().await;
        state.counts()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
