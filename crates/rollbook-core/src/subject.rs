//! Subject — a course offering with bounded enrollment capacity.

use serde::{Deserialize, Serialize};

/// A subject record.
///
/// `available_slots` counts the capacity not yet consumed by enrollments and
/// is bounded by `0 <= available_slots <= slots`. Only the slot-accounting
/// store operations move it, one unit at a time; enrollment claims a slot,
/// withdrawal releases one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:              i64,
  pub name:            String,
  pub code:            String,
  pub credits:         u32,
  pub slots:           u32,
  pub available_slots: u32,
  pub status:          bool,
}

/// Input for creating or replacing a subject. `available_slots` defaults to
/// `slots` (a fresh subject starts with all capacity free).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
  #[serde(default)]
  pub id:              Option<i64>,
  pub name:            String,
  pub code:            String,
  pub credits:         u32,
  pub slots:           u32,
  #[serde(default)]
  pub available_slots: Option<u32>,
  #[serde(default = "default_status")]
  pub status:          bool,
}

fn default_status() -> bool { true }
