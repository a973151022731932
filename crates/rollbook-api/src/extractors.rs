//! Custom axum extractors.
//!
//! Both wrappers exist so malformed input surfaces as the same
//! `{code, error, message}` envelope as every other failure, instead of
//! axum's plain-text rejections.

use axum::{
  extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
  http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON request body; rejections become 400s.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
  axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let axum::Json(value) = axum::Json::<T>::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Self(value))
  }
}

/// A numeric id path segment; missing or non-numeric input becomes a 400.
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Path(raw): Path<String> = Path::from_request_parts(parts, state)
      .await
      .map_err(|_| ApiError::BadRequest("missing id parameter".into()))?;

    let id = raw
      .parse::<i64>()
      .map_err(|_| ApiError::BadRequest(format!("invalid numeric id: {raw:?}")))?;
    Ok(Self(id))
  }
}
