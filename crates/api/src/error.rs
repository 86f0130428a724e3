//! HTTP error envelope.
//!
//! Every failure leaving a handler, including extractor rejections, is
//! rendered as `{ "error": <message>, "code": <CODE> }`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use hazard_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request body violated its `#[validate]` constraints.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matched the request path.
    #[error("No route for {0}")]
    UnknownRoute(String),

    #[error("Invalid JSON body: {}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("Invalid query string: {}", .0.body_text())]
    Query(#[from] QueryRejection),

    #[error("Invalid path parameter: {}", .0.body_text())]
    Path(#[from] PathRejection),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(core) => core_status(core),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::UnknownRoute(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_)
            | AppError::Json(_)
            | AppError::Query(_)
            | AppError::Path(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }

    /// Message shown to the client. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            AppError::Core(CoreError::Internal(detail)) => {
                tracing::error!(error = %detail, "Internal error while handling request");
                "An internal error occurred".to_string()
            }
            AppError::Core(
                CoreError::Validation(msg)
                | CoreError::Conflict(msg)
                | CoreError::Unauthorized(msg)
                | CoreError::Forbidden(msg),
            ) => msg.clone(),
            AppError::Validation(errors) => errors.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

fn core_status(error: &CoreError) -> (StatusCode, &'static str) {
    match error {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = json!({
            "error": self.public_message(),
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
