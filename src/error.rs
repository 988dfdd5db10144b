use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const TEST_ERROR_DETAIL: &str = "This is a test error for monitoring";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation { status: StatusCode, message: String },

    #[error("endpoint not found: {path}")]
    NotFound { path: String },

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Raised on purpose by `/error-test` so alerting pipelines can be exercised.
    #[error("This is a test error for monitoring")]
    TestError { path: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::TestError { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("worker task failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation { message, .. } => json!({
                "message": "Validation failed",
                "detail": message,
            }),
            AppError::NotFound { path } => json!({
                "message": "Endpoint not found",
                "path": path,
            }),
            AppError::MethodNotAllowed { method, path } => json!({
                "message": "Method not allowed",
                "method": method,
                "path": path,
            }),
            AppError::TestError { path } => {
                tracing::warn!(path = %path, "Synthetic test error raised");
                json!({
                    "message": "Internal server error",
                    "detail": TEST_ERROR_DETAIL,
                    "path": path,
                })
            }
            AppError::Internal(cause) => {
                tracing::error!("Internal error: {}", cause);
                json!({ "message": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Renders a handler panic as the regular internal-error JSON.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let cause = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("handler panicked: {cause}")).into_response()
}
