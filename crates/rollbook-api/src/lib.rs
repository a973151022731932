//! JSON REST API for Rollbook.
//!
//! Exposes an axum [`Router`] backed by any store implementing the three
//! collection traits. Transport, TLS, and process wiring are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(store));
//! let app = rollbook_api::api_router(state, &RoutePaths::default());
//! ```

pub mod error;
pub mod extractors;
pub mod registrations;
pub mod response;
pub mod students;
pub mod subjects;

use std::sync::Arc;

use axum::{Router, routing::get};
use rollbook_core::{
  services::{RegisterService, StudentService, SubjectService},
  store::{RegistrationStore, StudentStore, SubjectStore},
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// The services are wired once, from a single shared store handle, and
/// cloned cheaply per request.
pub struct AppState<S> {
  pub students:      StudentService<S>,
  pub subjects:      SubjectService<S>,
  pub registrations: RegisterService<S>,
}

impl<S> AppState<S>
where
  S: StudentStore + SubjectStore + RegistrationStore,
{
  /// Wire all services over one shared store.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      students:      StudentService::new(Arc::clone(&store)),
      subjects:      SubjectService::new(Arc::clone(&store)),
      registrations: RegisterService::new(store),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      students:      self.students.clone(),
      subjects:      self.subjects.clone(),
      registrations: self.registrations.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Mount paths for the three resource routers, overridable from the server
/// configuration.
#[derive(Debug, Clone)]
pub struct RoutePaths {
  pub students:      String,
  pub subjects:      String,
  pub registrations: String,
}

impl Default for RoutePaths {
  fn default() -> Self {
    Self {
      students:      "/students".into(),
      subjects:      "/subjects".into(),
      registrations: "/registrations".into(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>, paths: &RoutePaths) -> Router<()>
where
  S: StudentStore + SubjectStore + RegistrationStore + 'static,
{
  Router::new()
    .nest(&paths.students, students::router())
    .nest(&paths.subjects, subjects::router())
    .nest(&paths.registrations, registrations::router())
    .route("/ping", get(ping))
    .with_state(state)
}

/// `GET /ping` — liveness probe.
async fn ping() -> &'static str { "pong" }
