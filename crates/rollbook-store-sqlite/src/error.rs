//! Error type for `rollbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

/// Collapse into the core error at the trait boundary: typed domain errors
/// pass through unchanged, infrastructure failures become `Error::Store`.
impl From<Error> for rollbook_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => rollbook_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
