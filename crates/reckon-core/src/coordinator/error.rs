use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::calc::CalcError;
use crate::registry::RegistryError;

/// Errors surfaced by the coordinator's HTTP API.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The submitted expression does not compile or evaluate.
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Expression not found")]
    NotFound,

    #[error("No tasks available")]
    NoTasks,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CoordinatorError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoordinatorError::Calc(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoordinatorError::InvalidBody => StatusCode::BAD_REQUEST,
            CoordinatorError::NotFound | CoordinatorError::NoTasks => StatusCode::NOT_FOUND,
            CoordinatorError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            CoordinatorError::Registry(err) => {
                error!(error = %err, "registry rejected request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
