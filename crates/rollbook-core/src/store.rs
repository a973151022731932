//! The store traits implemented by storage backends.
//!
//! One trait per entity collection, mirroring the repository split of the
//! service layer. A single backend type is expected to implement all three
//! (e.g. `rollbook-store-sqlite`); higher layers depend on these
//! abstractions, not on any concrete backend.
//!
//! Lookups return `Option` and leave the not-found classification to the
//! services. Writes that can fail on domain grounds (duplicate ids, slot
//! guards) return typed [`Error`](crate::Error) variants directly.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  Result,
  registration::Registration,
  student::Student,
  subject::Subject,
};

// ─── Students ────────────────────────────────────────────────────────────────

/// Persistence surface for the student collection.
pub trait StudentStore: Send + Sync {
  /// List every student.
  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>>> + Send + '_;

  /// Retrieve a student by id. Returns `None` if not found.
  fn get_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Student>>> + Send + '_;

  /// Look up a student by their unique student code.
  fn get_student_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Student>>> + Send + 'a;

  /// Look up a student by their `(document_type, document_number)` pair.
  fn get_student_by_document<'a>(
    &'a self,
    doc_type: &'a str,
    doc_number: &'a str,
  ) -> impl Future<Output = Result<Option<Student>>> + Send + 'a;

  /// Batch lookup by id, used to materialise join results. Ids with no
  /// matching row are skipped.
  fn list_students_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Student>>> + Send + 'a;

  /// Persist a new student. Fails with
  /// [`Error::StudentExists`](crate::Error::StudentExists) if the id is
  /// taken and [`Error::StudentCodeTaken`](crate::Error::StudentCodeTaken)
  /// if the code is.
  fn add_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<Student>> + Send + '_;

  /// Overwrite an existing student, keyed by `student.id`.
  fn update_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<Student>> + Send + '_;

  /// Delete a student by id and return the deleted row.
  fn remove_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Student>> + Send + '_;
}

// ─── Subjects ────────────────────────────────────────────────────────────────

/// Persistence surface for the subject collection, including the
/// slot-accounting operations the enrollment flow depends on.
pub trait SubjectStore: Send + Sync {
  /// List every subject.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>>> + Send + '_;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Subject>>> + Send + '_;

  /// Batch lookup by id, used to materialise join results. Ids with no
  /// matching row are skipped.
  fn list_subjects_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Subject>>> + Send + 'a;

  /// Persist a new subject. Fails with
  /// [`Error::SubjectExists`](crate::Error::SubjectExists) if the id is
  /// taken and [`Error::SubjectCodeTaken`](crate::Error::SubjectCodeTaken)
  /// if the code is.
  fn add_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;

  /// Overwrite an existing subject, keyed by `subject.id`.
  fn update_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;

  /// Delete a subject by id and return the deleted row.
  fn remove_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;

  /// Atomically consume one available slot and return the updated subject.
  ///
  /// Fails with [`Error::SubjectExhausted`](crate::Error::SubjectExhausted)
  /// when `available_slots` is already zero; the counter is never driven
  /// below zero, even by concurrent callers.
  fn claim_slot(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;

  /// Atomically return one slot and return the updated subject.
  ///
  /// Fails with [`Error::SubjectAtCapacity`](crate::Error::SubjectAtCapacity)
  /// when `available_slots` already equals `slots`.
  fn release_slot(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;

  /// Overwrite both slot counters directly. Callers are expected to have
  /// validated `available_slots <= slots`; the backend may still reject a
  /// violating pair.
  fn set_slot_counts(
    &self,
    id: i64,
    slots: u32,
    available_slots: u32,
  ) -> impl Future<Output = Result<Subject>> + Send + '_;
}

// ─── Registrations ───────────────────────────────────────────────────────────

/// Persistence surface for the registration collection.
pub trait RegistrationStore: Send + Sync {
  /// List every registration.
  fn list_registrations(
    &self,
  ) -> impl Future<Output = Result<Vec<Registration>>> + Send + '_;

  /// Retrieve the registration for a `(student, subject)` pair, if any.
  fn get_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> impl Future<Output = Result<Option<Registration>>> + Send + '_;

  /// Persist a new registration.
  fn add_registration(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Registration>> + Send + '_;

  /// Delete the registration for a `(student, subject)` pair and return the
  /// deleted row. Fails with
  /// [`Error::RegistrationNotFound`](crate::Error::RegistrationNotFound)
  /// when no such pair exists.
  fn remove_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> impl Future<Output = Result<Registration>> + Send + '_;

  /// The subject ids a student is registered in.
  fn subject_ids_for_student(
    &self,
    student: i64,
  ) -> impl Future<Output = Result<Vec<i64>>> + Send + '_;

  /// The student ids registered in a subject.
  fn student_ids_for_subject(
    &self,
    subject: i64,
  ) -> impl Future<Output = Result<Vec<i64>>> + Send + '_;
}
