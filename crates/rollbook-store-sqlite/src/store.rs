//! [`SqliteStore`] — the SQLite implementation of the three collection
//! traits.
//!
//! Slot accounting uses guarded single-statement UPDATEs, so an individual
//! counter can never leave `[0, slots]` even under concurrent requests. The
//! slot adjustment and the registration write remain two separate calls;
//! the service layer owns their ordering.

use std::path::Path;

use rusqlite::OptionalExtension as _;

use rollbook_core::{
  Error as CoreError, Result as CoreResult,
  registration::Registration,
  store::{RegistrationStore, StudentStore, SubjectStore},
  student::Student,
  subject::Subject,
};

use crate::{
  Error, Result,
  encode::{
    encode_dt, registration_from_row, student_from_row, subject_from_row,
  },
  schema::SCHEMA,
};

pub const STUDENT_COLUMNS: &str =
  "id, document_number, document_type, name, surname, student_code, email, state";
pub const SUBJECT_COLUMNS: &str =
  "id, name, code, credits, slots, available_slots, status";
pub const REGISTRATION_COLUMNS: &str = "id_student, id_subject, date_register";

fn row_exists(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, params, |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollbook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  async fn list_students(&self) -> CoreResult<Vec<Student>> {
    let students = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {STUDENT_COLUMNS} FROM students"))?;
        let rows = stmt
          .query_map([], student_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(students)
  }

  async fn get_student(&self, id: i64) -> CoreResult<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
              rusqlite::params![id],
              student_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;
    Ok(student)
  }

  async fn get_student_by_code(&self, code: &str) -> CoreResult<Option<Student>> {
    let code = code.to_owned();
    let student = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STUDENT_COLUMNS} FROM students WHERE student_code = ?1"
              ),
              rusqlite::params![code],
              student_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;
    Ok(student)
  }

  async fn get_student_by_document(
    &self,
    doc_type: &str,
    doc_number: &str,
  ) -> CoreResult<Option<Student>> {
    let doc_type = doc_type.to_owned();
    let doc_number = doc_number.to_owned();
    let student = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STUDENT_COLUMNS} FROM students
                 WHERE document_type = ?1 AND document_number = ?2"
              ),
              rusqlite::params![doc_type, doc_number],
              student_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;
    Ok(student)
  }

  async fn list_students_by_ids(&self, ids: &[i64]) -> CoreResult<Vec<Student>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    let students = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students WHERE id IN ({placeholders})"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids), student_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(students)
  }

  async fn add_student(&self, student: Student) -> CoreResult<Student> {
    let to_insert = student.clone();
    let (id_taken, code_taken) = self
      .conn
      .call(move |conn| {
        let id_taken = row_exists(
          conn,
          "SELECT 1 FROM students WHERE id = ?1",
          rusqlite::params![to_insert.id],
        )?;
        let code_taken = row_exists(
          conn,
          "SELECT 1 FROM students WHERE student_code = ?1",
          rusqlite::params![to_insert.student_code],
        )?;
        if !id_taken && !code_taken {
          conn.execute(
            "INSERT INTO students (
               id, document_number, document_type, name, surname,
               student_code, email, state
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
              to_insert.id,
              to_insert.document_number,
              to_insert.document_type,
              to_insert.name,
              to_insert.surname,
              to_insert.student_code,
              to_insert.email,
              to_insert.state,
            ],
          )?;
        }
        Ok((id_taken, code_taken))
      })
      .await
      .map_err(Error::from)?;

    if id_taken {
      return Err(CoreError::StudentExists(student.id));
    }
    if code_taken {
      return Err(CoreError::StudentCodeTaken(student.student_code));
    }
    Ok(student)
  }

  async fn update_student(&self, student: Student) -> CoreResult<Student> {
    let id = student.id;
    let updated = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE students SET
             document_number = ?2, document_type = ?3, name = ?4,
             surname = ?5, student_code = ?6, email = ?7, state = ?8
           WHERE id = ?1",
          rusqlite::params![
            student.id,
            student.document_number,
            student.document_type,
            student.name,
            student.surname,
            student.student_code,
            student.email,
            student.state,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
          rusqlite::params![student.id],
          student_from_row,
        )?))
      })
      .await
      .map_err(Error::from)?;
    updated.ok_or(CoreError::StudentNotFound(id))
  }

  async fn remove_student(&self, id: i64) -> CoreResult<Student> {
    let removed = self
      .conn
      .call(move |conn| {
        let student = conn
          .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
            rusqlite::params![id],
            student_from_row,
          )
          .optional()?;
        if student.is_some() {
          conn.execute(
            "DELETE FROM students WHERE id = ?1",
            rusqlite::params![id],
          )?;
        }
        Ok(student)
      })
      .await
      .map_err(Error::from)?;
    removed.ok_or(CoreError::StudentNotFound(id))
  }
}

// ─── SubjectStore impl ───────────────────────────────────────────────────────

impl SubjectStore for SqliteStore {
  async fn list_subjects(&self) -> CoreResult<Vec<Subject>> {
    let subjects = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects"))?;
        let rows = stmt
          .query_map([], subject_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(subjects)
  }

  async fn get_subject(&self, id: i64) -> CoreResult<Option<Subject>> {
    let subject = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
              rusqlite::params![id],
              subject_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;
    Ok(subject)
  }

  async fn list_subjects_by_ids(&self, ids: &[i64]) -> CoreResult<Vec<Subject>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    let subjects = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id IN ({placeholders})"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids), subject_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(subjects)
  }

  async fn add_subject(&self, subject: Subject) -> CoreResult<Subject> {
    let to_insert = subject.clone();
    let (id_taken, code_taken) = self
      .conn
      .call(move |conn| {
        let id_taken = row_exists(
          conn,
          "SELECT 1 FROM subjects WHERE id = ?1",
          rusqlite::params![to_insert.id],
        )?;
        let code_taken = row_exists(
          conn,
          "SELECT 1 FROM subjects WHERE code = ?1",
          rusqlite::params![to_insert.code],
        )?;
        if !id_taken && !code_taken {
          conn.execute(
            "INSERT INTO subjects (
               id, name, code, credits, slots, available_slots, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
              to_insert.id,
              to_insert.name,
              to_insert.code,
              to_insert.credits,
              to_insert.slots,
              to_insert.available_slots,
              to_insert.status,
            ],
          )?;
        }
        Ok((id_taken, code_taken))
      })
      .await
      .map_err(Error::from)?;

    if id_taken {
      return Err(CoreError::SubjectExists(subject.id));
    }
    if code_taken {
      return Err(CoreError::SubjectCodeTaken(subject.code));
    }
    Ok(subject)
  }

  async fn update_subject(&self, subject: Subject) -> CoreResult<Subject> {
    let id = subject.id;
    let updated = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE subjects SET
             name = ?2, code = ?3, credits = ?4, slots = ?5,
             available_slots = ?6, status = ?7
           WHERE id = ?1",
          rusqlite::params![
            subject.id,
            subject.name,
            subject.code,
            subject.credits,
            subject.slots,
            subject.available_slots,
            subject.status,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
          rusqlite::params![subject.id],
          subject_from_row,
        )?))
      })
      .await
      .map_err(Error::from)?;
    updated.ok_or(CoreError::SubjectNotFound(id))
  }

  async fn remove_subject(&self, id: i64) -> CoreResult<Subject> {
    let removed = self
      .conn
      .call(move |conn| {
        let subject = conn
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
            rusqlite::params![id],
            subject_from_row,
          )
          .optional()?;
        if subject.is_some() {
          conn.execute(
            "DELETE FROM subjects WHERE id = ?1",
            rusqlite::params![id],
          )?;
        }
        Ok(subject)
      })
      .await
      .map_err(Error::from)?;
    removed.ok_or(CoreError::SubjectNotFound(id))
  }

  async fn claim_slot(&self, id: i64) -> CoreResult<Subject> {
    let (exists, claimed) = self
      .conn
      .call(move |conn| {
        // The guard rides inside the UPDATE, so two racing claims for the
        // last slot cannot both pass it.
        let changed = conn.execute(
          "UPDATE subjects SET available_slots = available_slots - 1
           WHERE id = ?1 AND available_slots > 0",
          rusqlite::params![id],
        )?;
        if changed == 1 {
          let subject = conn.query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
            rusqlite::params![id],
            subject_from_row,
          )?;
          return Ok((true, Some(subject)));
        }
        let exists = row_exists(
          conn,
          "SELECT 1 FROM subjects WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok((exists, None))
      })
      .await
      .map_err(Error::from)?;

    match claimed {
      Some(subject) => Ok(subject),
      None if exists => Err(CoreError::SubjectExhausted(id)),
      None => Err(CoreError::SubjectNotFound(id)),
    }
  }

  async fn release_slot(&self, id: i64) -> CoreResult<Subject> {
    let (exists, released) = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE subjects SET available_slots = available_slots + 1
           WHERE id = ?1 AND available_slots < slots",
          rusqlite::params![id],
        )?;
        if changed == 1 {
          let subject = conn.query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
            rusqlite::params![id],
            subject_from_row,
          )?;
          return Ok((true, Some(subject)));
        }
        let exists = row_exists(
          conn,
          "SELECT 1 FROM subjects WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok((exists, None))
      })
      .await
      .map_err(Error::from)?;

    match released {
      Some(subject) => Ok(subject),
      None if exists => Err(CoreError::SubjectAtCapacity(id)),
      None => Err(CoreError::SubjectNotFound(id)),
    }
  }

  async fn set_slot_counts(
    &self,
    id: i64,
    slots: u32,
    available_slots: u32,
  ) -> CoreResult<Subject> {
    let updated = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE subjects SET slots = ?2, available_slots = ?3 WHERE id = ?1",
          rusqlite::params![id, slots, available_slots],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
          rusqlite::params![id],
          subject_from_row,
        )?))
      })
      .await
      .map_err(Error::from)?;
    updated.ok_or(CoreError::SubjectNotFound(id))
  }
}

// ─── RegistrationStore impl ──────────────────────────────────────────────────

impl RegistrationStore for SqliteStore {
  async fn list_registrations(&self) -> CoreResult<Vec<Registration>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REGISTRATION_COLUMNS} FROM registrations"
        ))?;
        let rows = stmt
          .query_map([], registration_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;

    let registrations = raws
      .into_iter()
      .map(|raw| raw.into_registration())
      .collect::<Result<Vec<_>>>()?;
    Ok(registrations)
  }

  async fn get_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> CoreResult<Option<Registration>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations
                 WHERE id_student = ?1 AND id_subject = ?2"
              ),
              rusqlite::params![student, subject],
              registration_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;

    let registration = raw
      .map(|raw| raw.into_registration())
      .transpose()?;
    Ok(registration)
  }

  async fn add_registration(
    &self,
    registration: Registration,
  ) -> CoreResult<Registration> {
    let id_student = registration.id_student;
    let id_subject = registration.id_subject;
    let date_str = encode_dt(registration.date_register);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO registrations (id_student, id_subject, date_register)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_student, id_subject, date_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    Ok(registration)
  }

  async fn remove_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> CoreResult<Registration> {
    let removed = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {REGISTRATION_COLUMNS} FROM registrations
               WHERE id_student = ?1 AND id_subject = ?2"
            ),
            rusqlite::params![student, subject],
            registration_from_row,
          )
          .optional()?;
        if raw.is_some() {
          conn.execute(
            "DELETE FROM registrations WHERE id_student = ?1 AND id_subject = ?2",
            rusqlite::params![student, subject],
          )?;
        }
        Ok(raw)
      })
      .await
      .map_err(Error::from)?;

    match removed {
      Some(raw) => Ok(raw.into_registration()?),
      None => Err(CoreError::RegistrationNotFound { student, subject }),
    }
  }

  async fn subject_ids_for_student(&self, student: i64) -> CoreResult<Vec<i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id_subject FROM registrations WHERE id_student = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![student], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(ids)
  }

  async fn student_ids_for_subject(&self, subject: i64) -> CoreResult<Vec<i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id_student FROM registrations WHERE id_subject = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![subject], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(ids)
  }
}
