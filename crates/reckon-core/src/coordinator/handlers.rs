//! axum handlers for the client and worker APIs.
//!
//! Bodies are taken as raw bytes and decoded with `serde_json` so that a bad
//! body always yields `400 {"error": "Invalid request body"}` rather than
//! axum's own rejection text.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Coordinator, CoordinatorError, Submission};
use crate::calc::format_result;
use crate::domain::{BinaryJob, JobReport, Task, TaskId};
use crate::observability::RegistryCounts;

type AppState = State<Arc<Coordinator>>;

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CalculateResponse {
    Created { id: TaskId },
    Evaluated { result: String },
}

#[derive(Debug, Serialize)]
pub struct ExpressionsResponse {
    pub expressions: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct ExpressionResponse {
    pub expression: Task,
}

fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, CoordinatorError> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejecting request body");
        CoordinatorError::InvalidBody
    })
}

/// `POST /api/v1/calculate`
pub async fn calculate(State(coordinator): AppState, body: Bytes) -> Result<Response, CoordinatorError> {
    let request: CalculateRequest = decode(&body)?;
    let response = match coordinator.submit(&request.expression).await? {
        Submission::Created(id) => {
            (StatusCode::CREATED, Json(CalculateResponse::Created { id })).into_response()
        }
        Submission::Evaluated(value) => (
            StatusCode::OK,
            Json(CalculateResponse::Evaluated {
                result: format_result(value),
            }),
        )
            .into_response(),
    };
    Ok(response)
}

/// `GET /api/v1/expressions`, in registry order (unspecified).
pub async fn list_expressions(State(coordinator): AppState) -> Json<ExpressionsResponse> {
    let expressions = coordinator.list().await;
    Json(ExpressionsResponse { expressions })
}

/// `GET /api/v1/expressions/{id}`
pub async fn get_expression(
    State(coordinator): AppState,
    Path(id): Path<String>,
) -> Result<Json<ExpressionResponse>, CoordinatorError> {
    let expression = coordinator.get(&TaskId::new(id)).await?;
    Ok(Json(ExpressionResponse { expression }))
}

/// `GET /internal/task`
pub async fn get_task(State(coordinator): AppState) -> Result<Json<BinaryJob>, CoordinatorError> {
    coordinator.claim().await.map(Json).ok_or(CoordinatorError::NoTasks)
}

/// `POST /internal/task`. Answers 200 even when the job is unknown.
pub async fn post_task(State(coordinator): AppState, body: Bytes) -> Result<StatusCode, CoordinatorError> {
    let report: JobReport = decode(&body)?;
    coordinator.report(report).await;
    Ok(StatusCode::OK)
}

/// `GET /internal/status`
pub async fn status(State(coordinator): AppState) -> Json<RegistryCounts> {
    Json(coordinator.counts().await)
}
