//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Errors are dispatched on [`ErrorKind`], never on message text, and are
//! rendered as the `{code, error, message}` envelope.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollbook_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<rollbook_core::Error> for ApiError {
  fn from(err: rollbook_core::Error) -> Self {
    let message = err.to_string();
    match err.kind() {
      ErrorKind::BadRequest => ApiError::BadRequest(message),
      ErrorKind::NotFound => ApiError::NotFound(message),
      ErrorKind::Conflict => ApiError::Conflict(message),
      ErrorKind::Internal => ApiError::Internal(message),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, error, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "Bad Request", m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "Not Found", m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, "Conflict", m),
      ApiError::Internal(m) => {
        tracing::error!("internal error: {m}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", m)
      }
    };

    let body = Json(json!({
      "code": status.as_u16(),
      "error": error,
      "message": message,
    }));
    (status, body).into_response()
  }
}
