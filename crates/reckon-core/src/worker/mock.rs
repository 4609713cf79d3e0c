//! In-memory `CoordinatorClient` for worker tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::client::{ClientError, CoordinatorClient};
use crate::domain::{BinaryJob, JobReport};

#[derive(Default)]
pub(crate) struct MockClient {
    jobs: Mutex<VecDeque<BinaryJob>>,
    reports: Mutex<Vec<JobReport>>,
    fail_fetches: AtomicBool,
    fail_reports: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
}

impl MockClient {
    pub fn with_jobs(jobs: impl IntoIterator<Item = BinaryJob>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<JobReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make every fetch take `delay` before answering.
    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_reports(&self, fail: bool) {
        self.fail_reports.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CoordinatorClient for MockClient {
    async fn fetch_job(&self) -> Result<Option<BinaryJob>, ClientError> {
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(self.jobs.lock().unwrap().pop_front())
    }

    async fn submit_report(&self, report: &JobReport) -> Result<(), ClientError> {
        if self.fail_reports.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                status: StatusCode::BAD_REQUEST,
            });
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
