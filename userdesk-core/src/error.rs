use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;

use crate::validation::ValidationErrorResponse;

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Every failure a handler can report to a client.
///
/// Each variant maps to its own status code so callers can tell the kinds
/// apart without parsing the message.
pub enum HttpError {
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
    Validation(ValidationErrorResponse),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            HttpError::Validation(resp) => {
                let body = serde_json::json!({
                    "error": "Validation failed",
                    "details": resp.errors,
                });
                (status, Json(body)).into_response()
            }
            HttpError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                error_response(status, msg)
            }
            HttpError::NotFound(msg)
            | HttpError::Conflict(msg)
            | HttpError::BadRequest(msg)
            | HttpError::PayloadTooLarge(msg) => error_response(status, msg),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            HttpError::Validation(resp) => write!(f, "Validation Error: {} errors", resp.errors.len()),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal(err.to_string())
    }
}

impl From<ValidationErrorResponse> for HttpError {
    fn from(resp: ValidationErrorResponse) -> Self {
        HttpError::Validation(resp)
    }
}
