//! Handlers for the registrations endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/registrations` | All registrations |
//! | `POST`   | `/registrations` | Body: `{"idStudent":42,"idSubject":2,"date":"..."}` |
//! | `DELETE` | `/registrations` | Body: `{"idStudent":42,"idSubject":2}` |
//! | `GET`    | `/registrations/student/:id` | Subjects the student is enrolled in |
//! | `GET`    | `/registrations/subject/:id` | Students enrolled in the subject |
//!
//! Enrollment outcomes map 404 (missing referent), 409 (duplicate pair or
//! exhausted capacity) and 400 (missing ids).

use axum::{
  Router,
  extract::State,
  response::IntoResponse,
  routing::get,
};
use chrono::{DateTime, Utc};
use rollbook_core::{
  registration::NewRegistration,
  store::{RegistrationStore, StudentStore, SubjectStore},
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
    .route("/", get(list::<S>).post(create::<S>).delete(remove::<S>))
    .route("/student/{id}", get(subjects_by_student::<S>))
    .route("/subject/{id}", get(students_by_subject::<S>))
}

// ─── Collection ───────────────────────────────────────────────────────────────

/// `GET /registrations`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let registrations = state.registrations.list().await?;
  Ok(ok("Registrations found", registrations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(default)]
  pub id_student:    Option<i64>,
  #[serde(default)]
  pub id_subject:    Option<i64>,
  #[serde(default, alias = "date")]
  pub date_register: Option<DateTime<Utc>>,
}

/// `POST /registrations`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Body(body): Body<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let (Some(id_student), Some(id_subject)) = (body.id_student, body.id_subject)
  else {
    return Err(ApiError::BadRequest(
      "missing idStudent or idSubject parameter".into(),
    ));
  };

  let registration = state
    .registrations
    .enroll(NewRegistration {
      id_student,
      id_subject,
      date_register: body.date_register,
    })
    .await?;
  Ok(created("Registration created", registration))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBody {
  #[serde(default)]
  pub id_student: Option<i64>,
  #[serde(default)]
  pub id_subject: Option<i64>,
}

/// `DELETE /registrations`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Body(body): Body<DeleteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let (Some(id_student), Some(id_subject)) = (body.id_student, body.id_subject)
  else {
    return Err(ApiError::BadRequest(
      "missing idStudent or idSubject parameter".into(),
    ));
  };

  let registration = state.registrations.withdraw(id_student, id_subject).await?;
  Ok(ok("Registration deleted", registration))
}

// ─── Joins ────────────────────────────────────────────────────────────────────

/// `GET /registrations/student/:id`
pub async fn subjects_by_student<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let subjects = state.registrations.subjects_for_student(id).await?;
  Ok(ok("Subjects found", subjects))
}

/// `GET /registrations/subject/:id`
pub async fn students_by_subject<S>(
  State(state): State<AppState<S>>,
  PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  let students = state.registrations.students_for_subject(id).await?;
  Ok(ok("Students found", students))
}
