//! Handlers for the students endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | All students |
//! | `POST`   | `/students` | 201; id defaults to an epoch-millis timestamp |
//! | `GET`    | `/students/:id` | 404 if not found |
//! | `PUT`    | `/students/:id` | Full replace; body id is ignored |
//! | `PATCH`  | `/students/:id/state` | Body: `{"state":false}` |
//! | `DELETE` | `/students/:id` | Returns the deleted student |
//! | `GET`    | `/students/code/:code` | Lookup by unique student code |
//! | `GET`    | `/students/document/:type/:number` | Lookup by document |

use axum::{
  Router,
  extract::{Path, State},
  response::IntoResponse,
  routing::{get, patch},
};
use rollbook_core::{
  store::{RegistrationStore, StudentStore, SubjectStore},
  student::NewStudent,
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
    .route("/{id}/state", patch(change_state::<S>))
    .route("/code/{code}", get(get_by_code::<S>))
    .route("/document/{doc_type}/{doc_number}", get(get_by_document::<S>))
}

// ─── Collection ───────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let students = state.students.list().await?;
  Ok(ok("Students found", students))
}

/// `POST /students`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Body(new): Body<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.create(new).await?;
  Ok(created("Student created", student))
}

// ─── Single resource ──────────────────────────────────────────────────────────

/// `GET /students/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.get(id).await?;
  Ok(ok("Student found", student))
}

/// `PUT /students/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
  Body(changes): Body<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.update(id, changes).await?;
  Ok(ok("Student updated", student))
}

#[derive(Debug, Deserialize)]
pub struct StateBody {
  pub state: bool,
}

/// `PATCH /students/:id/state` — body: `{"state":false}`
pub async fn change_state<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
  Body(body): Body<StateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.change_state(id, body.state).await?;
  Ok(ok("Student state updated", student))
}

/// `DELETE /students/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.delete(id).await?;
  Ok(ok("Student deleted", student))
}

// ─── Natural-key lookups ──────────────────────────────────────────────────────

/// `GET /students/code/:code`
pub async fn get_by_code<S>(
  State(state): State<AppState<S>>,
  Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.get_by_code(&code).await?;
  Ok(ok("Student found", student))
}

/// `GET /students/document/:doc_type/:doc_number`
pub async fn get_by_document<S>(
  State(state): State<AppState<S>>,
  Path((doc_type, doc_number)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let student = state.students.get_by_document(&doc_type, &doc_number).await?;
  Ok(ok("Student found", student))
}
