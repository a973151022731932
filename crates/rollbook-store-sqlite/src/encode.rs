//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, booleans as 0/1 integers.
//! Integer ids and counters map directly.

use chrono::{DateTime, Utc};
use rollbook_core::{registration::Registration, student::Student, subject::Subject};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

/// Map a `students` row selected in `STUDENT_COLUMNS` order.
pub fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:              row.get(0)?,
    document_number: row.get(1)?,
    document_type:   row.get(2)?,
    name:            row.get(3)?,
    surname:         row.get(4)?,
    student_code:    row.get(5)?,
    email:           row.get(6)?,
    state:           row.get(7)?,
  })
}

/// Map a `subjects` row.
pub fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    id:              row.get(0)?,
    name:            row.get(1)?,
    code:            row.get(2)?,
    credits:         row.get(3)?,
    slots:           row.get(4)?,
    available_slots: row.get(5)?,
    status:          row.get(6)?,
  })
}

/// A `registrations` row as read straight out of SQLite; the timestamp is
/// still text and is decoded outside the connection thread.
pub struct RawRegistration {
  pub id_student:    i64,
  pub id_subject:    i64,
  pub date_register: String,
}

impl RawRegistration {
  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      id_student:    self.id_student,
      id_subject:    self.id_subject,
      date_register: decode_dt(&self.date_register)?,
    })
  }
}

/// Map a `registrations` row.
pub fn registration_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawRegistration> {
  Ok(RawRegistration {
    id_student:    row.get(0)?,
    id_subject:    row.get(1)?,
    date_register: row.get(2)?,
  })
}
