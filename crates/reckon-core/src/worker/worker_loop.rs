//! Single worker: poll, compute, report.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::client::CoordinatorClient;
use crate::domain::{BinaryJob, JobReport};

/// Worker state.
///
/// State transitions:
/// - Idle -> Computing (a job was fetched)
/// - Computing -> Idle (report sent, or sending failed)
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerState {
    Idle,
    Computing(BinaryJob),
}

pub struct WorkerLoop {
    worker_id: usize,
    client: Arc<dyn CoordinatorClient>,
    poll_interval: Duration,
    state: WorkerState,
}

impl WorkerLoop {
    pub fn new(worker_id: usize, client: Arc<dyn CoordinatorClient>, poll_interval: Duration) -> Self {
        Self {
            worker_id,
            client,
            poll_interval,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == WorkerState::Idle
    }

    /// Perform one transition.
    ///
    /// Returns `false` when an idle poll came back empty or failed, i.e. the
    /// caller should wait `poll_interval` before the next step.
    pub async fn step(&mut self) -> bool {
        match std::mem::replace(&mut self.state, WorkerState::Idle) {
            WorkerState::Idle => match self.poll().await {
                Some(job) => {
                    self.state = WorkerState::Computing(job);
                    true
                }
                None => false,
            },
            WorkerState::Computing(job) => {
                self.compute_and_report(job).await;
                true
            }
        }
    }

    async fn poll(&self) -> Option<BinaryJob> {
        match self.client.fetch_job().await {
            Ok(Some(job)) => {
                debug!(worker_id = self.worker_id, job_id = %job.id, "job received");
                Some(job)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(worker_id = self.worker_id, error = %err, "poll failed");
                None
            }
        }
    }

    /// A failed report is logged and dropped; the coordinator's claim
    /// timeout makes the job available again.
    async fn compute_and_report(&self, job: BinaryJob) {
        let report = JobReport::from_computation(job.id.clone(), job.compute());
        match self.client.submit_report(&report).await {
            Ok(()) => debug!(
                worker_id = self.worker_id,
                job_id = %job.id,
                result = ?report.result,
                error = ?report.error,
                "job reported"
            ),
            Err(err) => warn!(
                worker_id = self.worker_id,
                job_id = %job.id,
                error = %err,
                "report failed"
            ),
        }
    }

    /// Loop until `shutdown` flips to `true`.
    ///
    /// Shutdown only interrupts the backoff sleep. A poll already in flight
    /// completes, and a job it returns is computed and reported before the
    /// loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(worker_id = self.worker_id, "worker started");
        loop {
            if *shutdown.borrow() && self.is_idle() {
                break;
            }
            if self.step().await {
                continue;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
        info!(worker_id = self.worker_id, "worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::Operator;
    use crate::domain::{JobId, JobOutcome};
    use crate::worker::mock::MockClient;

    fn job(id: &str, arg1: f64, arg2: f64, operation: Operator) -> BinaryJob {
        BinaryJob {
            id: JobId::new(id),
            arg1,
            arg2,
            operation,
        }
    }

    fn worker(client: &Arc<MockClient>) -> WorkerLoop {
        WorkerLoop::new(0, client.clone(), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn idle_to_computing_to_idle() {
        let client = Arc::new(MockClient::with_jobs([job("job_1", 3.0, 5.0, Operator::Add)]));
        let mut worker = worker(&client);

        assert!(worker.step().await);
        assert!(matches!(worker.state(), WorkerState::Computing(j) if j.id.as_str() == "job_1"));

        assert!(worker.step().await);
        assert!(worker.is_idle());

        let reports = client.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome(), JobOutcome::Value(8.0));
    }

    #[tokio::test]
    async fn division_by_zero_is_reported_as_error() {
        let client = Arc::new(MockClient::with_jobs([job("job_1", 1.0, 0.0, Operator::Div)]));
        let mut worker = worker(&client);
        worker.step().await;
        worker.step().await;

        let reports = client.reports();
        assert_eq!(reports[0].result, None);
        assert_eq!(reports[0].error.as_deref(), Some("division by zero"));
    }

    #[tokio::test]
    async fn empty_or_failed_poll_stays_idle() {
        let client = Arc::new(MockClient::default());
        let mut worker = worker(&client);
        assert!(!worker.step().await);
        assert!(worker.is_idle());

        client.fail_fetches(true);
        assert!(!worker.step().await);
        assert!(worker.is_idle());
    }

    #[tokio::test]
    async fn failed_report_returns_to_idle_without_resend() {
        let client = Arc::new(MockClient::with_jobs([job("job_1", 2.0, 2.0, Operator::Mul)]));
        client.fail_reports(true);
        let mut worker = worker(&client);

        worker.step().await;
        worker.step().await;
        assert!(worker.is_idle());
        assert!(client.reports().is_empty());
        assert!(!worker.step().await);
    }

    #[tokio::test]
    async fn run_exits_on_shutdown() {
        let client = Arc::new(MockClient::default());
        let worker = WorkerLoop::new(0, client, Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(worker.run(rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_during_poll_still_reports_the_job() {
        let client = Arc::new(MockClient::with_jobs([job("job_1", 6.0, 7.0, Operator::Mul)]));
        client.delay_fetches(Duration::from_millis(100));
        let worker = WorkerLoop::new(0, client.clone(), Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(worker.run(rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("worker did not stop")
            .unwrap();

        let reports = client.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome(), JobOutcome::Value(42.0));
    }
}
