//! The `{message, data}` success envelope shared by every handler.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

/// 200 response with the standard envelope.
pub fn ok(message: &str, data: impl Serialize) -> impl IntoResponse {
  (StatusCode::OK, Json(json!({ "message": message, "data": data })))
}

/// 201 response with the standard envelope.
pub fn created(message: &str, data: impl Serialize) -> impl IntoResponse {
  (StatusCode::CREATED, Json(json!({ "message": message, "data": data })))
}
