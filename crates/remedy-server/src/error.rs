use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use remedy_core::error::RemedyError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Some(e) = self.0.downcast_ref::<RemedyError>() else {
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        let (status, body) = match e {
            RemedyError::ActionNotPermitted {
                allowed,
                execution_id,
                ..
            } => (
                StatusCode::FORBIDDEN,
                serde_json::json!({
                    "error": e.to_string(),
                    "reason": "not_permitted",
                    "allowed_actions": allowed,
                    "execution_id": execution_id,
                }),
            ),
            RemedyError::ValidationFailed { errors, .. } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": e.to_string(),
                    "reason": "invalid_params",
                    "errors": errors,
                }),
            ),
            RemedyError::InvalidFilter(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": e.to_string(), "reason": "invalid_filter" }),
            ),
            RemedyError::NotInitialized => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": e.to_string() }),
            ),
            RemedyError::Persistence(_)
            | RemedyError::NotifierSetup(_)
            | RemedyError::Io(_)
            | RemedyError::Yaml(_)
            | RemedyError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": e.to_string() }),
            ),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
