//! Student — a person who can be enrolled in subjects.

use serde::{Deserialize, Serialize};

/// A student record.
///
/// `id` is application-assigned (derived from an epoch-millis timestamp when
/// the caller does not supply one) and is the key every other part of the
/// system uses; the store's native row identity is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:              i64,
  pub document_number: String,
  pub document_type:   String,
  pub name:            String,
  pub surname:         String,
  pub student_code:    String,
  pub email:           String,
  pub state:           bool,
}

/// Input for creating or replacing a student. The `id` is only honoured on
/// create; updates take the id from the resource path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
  #[serde(default)]
  pub id:              Option<i64>,
  pub document_number: String,
  pub document_type:   String,
  pub name:            String,
  pub surname:         String,
  pub student_code:    String,
  pub email:           String,
  #[serde(default = "default_state")]
  pub state:           bool,
}

fn default_state() -> bool { true }
