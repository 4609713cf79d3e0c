//! Worker-side view of the coordinator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::{BinaryJob, JobReport};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to coordinator failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("coordinator answered {status}")]
    UnexpectedStatus { status: StatusCode },
}

/// The two calls a worker makes.
#[async_trait]
pub trait CoordinatorClient: Send + Sync {
    /// `Ok(None)` when the coordinator has nothing to hand out.
    async fn fetch_job(&self) -> Result<Option<BinaryJob>, ClientError>;

    async fn submit_report(&self, report: &JobReport) -> Result<(), ClientError>;
}

/// `CoordinatorClient` over the coordinator's `/internal/task` endpoint.
pub struct HttpCoordinatorClient {
    http: reqwest::Client,
    task_url: String,
}

impl HttpCoordinatorClient {
    /// `request_timeout` bounds each exchange; a stalled call becomes a
    /// transport error.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            task_url: format!("{}/internal/task", base_url.trim_end_matches('/')),
        })
    }

    pub fn task_url(&self) -> &str {
        &self.task_url
    }
}

#[async_trait]
impl CoordinatorClient for HttpCoordinatorClient {
    async fn fetch_job(&self) -> Result<Option<BinaryJob>, ClientError> {
        let response = self.http.get(&self.task_url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<BinaryJob>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ClientError::UnexpectedStatus { status }),
        }
    }

    async fn submit_report(&self, report: &JobReport) -> Result<(), ClientError> {
        let response = self.http.post(&self.task_url).json(report).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::UnexpectedStatus { status })
        }
    }
}
