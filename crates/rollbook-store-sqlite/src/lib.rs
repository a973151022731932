//! SQLite backend for the Rollbook academic registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each entity collection is one
//! table, keyed by the application-assigned integer `id` rather than the
//! store's native rowid.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
