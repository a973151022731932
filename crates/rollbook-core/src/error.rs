//! Error types for `rollbook-core`.

use thiserror::Error;

/// Coarse classification of an [`Error`], used by the HTTP layer to pick a
/// status code without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  BadRequest,
  NotFound,
  Conflict,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(i64),

  #[error("student not found by code: {0:?}")]
  StudentCodeNotFound(String),

  #[error("student not found by document: {doc_type} {doc_number}")]
  StudentDocumentNotFound { doc_type: String, doc_number: String },

  #[error("subject not found: {0}")]
  SubjectNotFound(i64),

  #[error("registration not found: student {student}, subject {subject}")]
  RegistrationNotFound { student: i64, subject: i64 },

  #[error("registration already exists: student {student}, subject {subject}")]
  RegistrationExists { student: i64, subject: i64 },

  #[error("student already exists: {0}")]
  StudentExists(i64),

  #[error("student code already taken: {0:?}")]
  StudentCodeTaken(String),

  #[error("subject already exists: {0}")]
  SubjectExists(i64),

  #[error("subject code already taken: {0:?}")]
  SubjectCodeTaken(String),

  /// The subject has no available slots left to claim.
  #[error("subject {0} has no available slots")]
  SubjectExhausted(i64),

  /// Releasing a slot would push `available_slots` past `slots`.
  #[error("subject {0} already has all slots available")]
  SubjectAtCapacity(i64),

  #[error("invalid slot counts: {available} available of {slots} total")]
  InvalidSlotCounts { slots: u32, available: u32 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// The classification the HTTP layer maps onto a status code.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::StudentNotFound(_)
      | Error::StudentCodeNotFound(_)
      | Error::StudentDocumentNotFound { .. }
      | Error::SubjectNotFound(_)
      | Error::RegistrationNotFound { .. } => ErrorKind::NotFound,

      Error::RegistrationExists { .. }
      | Error::StudentExists(_)
      | Error::StudentCodeTaken(_)
      | Error::SubjectExists(_)
      | Error::SubjectCodeTaken(_)
      | Error::SubjectExhausted(_)
      | Error::SubjectAtCapacity(_) => ErrorKind::Conflict,

      Error::InvalidSlotCounts { .. } => ErrorKind::BadRequest,

      Error::Store(_) => ErrorKind::Internal,
    }
  }

  /// Wrap an arbitrary backend failure.
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
