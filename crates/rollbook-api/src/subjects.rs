//! Handlers for the subjects endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | All subjects |
//! | `POST`   | `/subjects` | 201; `availableSlots` defaults to `slots` |
//! | `GET`    | `/subjects/:id` | 404 if not found |
//! | `PUT`    | `/subjects/:id` | Full replace; body id is ignored |
//! | `PATCH`  | `/subjects/:id/slots` | Body: `{"slots":30,"availableSlots":12}` |
//! | `DELETE` | `/subjects/:id` | Returns the deleted subject |

use axum::{
  Router,
  extract::State,
  response::IntoResponse,
  routing::{get, patch},
};
use rollbook_core::{
  store::{RegistrationStore, StudentStore, SubjectStore},
  subject::NewSubject,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extractors::{Body, PathId},
  response::{created, ok},
};

pub fn router<S>() -> Router<AppState<S>>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  Router::new()
    .route("/", get(list::<S>).post(create::<S>))
    .route("/{id}", get(get_one::<S>).put(update::<S>).delete(remove::<S>))
    .route("/{id}/slots", patch(change_slots::<S>))
}

/// `GET /subjects`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subjects = state.subjects.list().await?;
  Ok(ok("Subjects found", subjects))
}

/// `POST /subjects`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Body(new): Body<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subject = state.subjects.create(new).await?;
  Ok(created("Subject created", subject))
}

/// `GET /subjects/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subject = state.subjects.get(id).await?;
  Ok(ok("Subject found", subject))
}

/// `PUT /subjects/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
  Body(changes): Body<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subject = state.subjects.update(id, changes).await?;
  Ok(ok("Subject updated", subject))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsBody {
  pub slots:           u32,
  pub available_slots: u32,
}

/// `PATCH /subjects/:id/slots` — overwrite both slot counters.
pub async fn change_slots<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
  Body(body): Body<SlotsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subject = state
    .subjects
    .change_slots(id, body.slots, body.available_slots)
    .await?;
  Ok(ok("Subject slots updated", subject))
}

/// `DELETE /subjects/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subject = state.subjects.delete(id).await?;
  Ok(ok("Subject deleted", subject))
}
