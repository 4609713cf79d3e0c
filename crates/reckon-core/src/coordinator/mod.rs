//! Coordinator: task submission, queries and the worker claim/report exchange.
//!
//! The HTTP surface lives in `handlers`; everything here is callable without a
//! socket, which is how the unit tests drive it.

mod error;
mod handlers;

pub use error::CoordinatorError;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::calc::{calc, format_result, Plan};
use crate::config::{CoordinatorConfig, EvaluationMode, IdScheme};
use crate::domain::{BinaryJob, JobReport, Task, TaskId};
use crate::observability::RegistryCounts;
use crate::ports::{IdGenerator, SequentialIdGenerator, SystemClock, UlidGenerator};
use crate::registry::{ReportEffect, TaskRegistry};

/// What `submit` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A pending task was created; poll it by id.
    Created(TaskId),
    /// Evaluated in the request (`EvaluationMode::Sync`).
    Evaluated(f64),
}

pub struct Coordinator {
    registry: Arc<TaskRegistry>,
    ids: Arc<dyn IdGenerator>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        registry: Arc<TaskRegistry>,
        ids: Arc<dyn IdGenerator>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            registry,
            ids,
            config,
        }
    }

    /// Fresh registry plus the id generator named by `config.id_scheme`.
    pub fn from_config(config: CoordinatorConfig) -> Self {
        let ids: Arc<dyn IdGenerator> = match config.id_scheme {
            IdScheme::Sequential => Arc::new(SequentialIdGenerator::new()),
            IdScheme::Ulid => Arc::new(UlidGenerator::new(SystemClock)),
        };
        Self::new(Arc::new(TaskRegistry::new()), ids, config)
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Accept an expression according to the configured mode.
    ///
    /// Compile errors are returned here in every mode. A failure that only
    /// shows up while running (division by zero) completes the task with an
    /// `"Error: ..."` result instead.
    pub async fn submit(&self, expression: &str) -> Result<Submission, CoordinatorError> {
        match self.config.mode {
            EvaluationMode::Sync => {
                let value = calc(expression)?;
                debug!(expression, value, "evaluated synchronously");
                Ok(Submission::Evaluated(value))
            }
            EvaluationMode::Local => {
                Plan::compile(expression)?;
                let id = self.create_task(expression).await?;

                let registry = Arc::clone(&self.registry);
                let task_id = id.clone();
                let expression = expression.to_string();
                tokio::spawn(async move {
                    let result = match calc(&expression) {
                        Ok(value) => format_result(value),
                        Err(err) => format!("Error: {err}"),
                    };
                    if registry.complete(&task_id, result.clone()).await {
                        info!(task_id = %task_id, result = %result, "task completed");
                    } else {
                        warn!(task_id = %task_id, "completed a task the registry does not know");
                    }
                });
                Ok(Submission::Created(id))
            }
            EvaluationMode::Workers => {
                let plan = Plan::compile(expression)?;
                let id = self.create_task(expression).await?;
                let jobs = self.registry.enqueue_plan(&id, &plan).await?;
                debug!(task_id = %id, jobs, "plan enqueued");
                Ok(Submission::Created(id))
            }
        }
    }

    async fn create_task(&self, expression: &str) -> Result<TaskId, CoordinatorError> {
        let id = self.ids.generate_task_id();
        self.registry
            .create_with_expression(id.clone(), expression)
            .await?;
        info!(task_id = %id, expression, mode = %self.config.mode, "task created");
        Ok(id)
    }

    pub async fn list(&self) -> Vec<Task> {
        self.registry.list().await
    }

    pub async fn get(&self, id: &TaskId) -> Result<Task, CoordinatorError> {
        self.registry.get(id).await.ok_or(CoordinatorError::NotFound)
    }

    /// Next job for a worker, per the configured claim mode.
    pub async fn claim(&self) -> Option<BinaryJob> {
        let job = self
            .registry
            .claim_job(self.config.claim_mode, self.config.claim_timeout())
            .await?;
        debug!(job_id = %job.id, operation = %job.operation, "job handed out");
        Some(job)
    }

    pub async fn report(&self, report: JobReport) -> ReportEffect {
        let effect = self.registry.report_job(&report.id, report.outcome()).await;
        match &effect {
            ReportEffect::Ignored => {
                warn!(job_id = %report.id, "report for an unknown or finished job ignored");
            }
            ReportEffect::Progressed { task_id } => {
                debug!(job_id = %report.id, task_id = %task_id, "job reported");
            }
            ReportEffect::TaskCompleted { task_id, result } => {
                info!(task_id = %task_id, result = %result, "task completed");
            }
        }
        effect
    }

    pub async fn counts(&self) -> RegistryCounts {
        self.registry.counts().await
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/api/v1/calculate", post(handlers::calculate))
            .route("/api/v1/expressions", get(handlers::list_expressions))
            .route("/api/v1/expressions/{id}", get(handlers::get_expression))
            .route(
                "/internal/task",
                get(handlers::get_task).post(handlers::post_task),
            )
            .route("/internal/status", get(handlers::status))
            .with_state(self)
    }

    /// Serve the API on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, mode = %self.config.mode, claim_mode = %self.config.claim_mode, "coordinator listening");
        axum::serve(listener, Arc::clone(&self).router())
            .with_graceful_shutdown(shutdown)
            .await?;
        let counts = self.counts().await;
        info!(?counts, "coordinator stopped");
        Ok(())
    }
}
