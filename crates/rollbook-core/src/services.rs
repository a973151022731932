//! Service layer — orchestration over the store traits.
//!
//! [`StudentService`] and [`SubjectService`] are thin pass-throughs over one
//! collection each, turning missed lookups into typed errors.
//! [`RegisterService`] is the only service coordinating across collections;
//! it owns the enrollment rules (referential checks, duplicate prevention,
//! slot accounting).
//!
//! Services are built once at process start from a shared store handle and
//! handed to the HTTP layer; they never construct their own backends.

use std::sync::Arc;

use chrono::Utc;

use crate::{
  Error, Result,
  registration::{NewRegistration, Registration},
  store::{RegistrationStore, StudentStore, SubjectStore},
  student::{NewStudent, Student},
  subject::{NewSubject, Subject},
};

// ─── Students ────────────────────────────────────────────────────────────────

pub struct StudentService<S> {
  store: Arc<S>,
}

impl<S> Clone for StudentService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: StudentStore> StudentService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn list(&self) -> Result<Vec<Student>> {
    self.store.list_students().await
  }

  pub async fn get(&self, id: i64) -> Result<Student> {
    self
      .store
      .get_student(id)
      .await?
      .ok_or(Error::StudentNotFound(id))
  }

  pub async fn get_by_code(&self, code: &str) -> Result<Student> {
    self
      .store
      .get_student_by_code(code)
      .await?
      .ok_or_else(|| Error::StudentCodeNotFound(code.to_owned()))
  }

  pub async fn get_by_document(
    &self,
    doc_type: &str,
    doc_number: &str,
  ) -> Result<Student> {
    self
      .store
      .get_student_by_document(doc_type, doc_number)
      .await?
      .ok_or_else(|| Error::StudentDocumentNotFound {
        doc_type:   doc_type.to_owned(),
        doc_number: doc_number.to_owned(),
      })
  }

  /// Create a student. When the caller does not supply an id, one is derived
  /// from the current epoch-millis timestamp.
  pub async fn create(&self, new: NewStudent) -> Result<Student> {
    let student = Student {
      id:              new.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
      document_number: new.document_number,
      document_type:   new.document_type,
      name:            new.name,
      surname:         new.surname,
      student_code:    new.student_code,
      email:           new.email,
      state:           new.state,
    };
    self.store.add_student(student).await
  }

  /// Replace the student at `id` with `changes` (any id inside the body is
  /// ignored).
  pub async fn update(&self, id: i64, changes: NewStudent) -> Result<Student> {
    let student = Student {
      id,
      document_number: changes.document_number,
      document_type:   changes.document_type,
      name:            changes.name,
      surname:         changes.surname,
      student_code:    changes.student_code,
      email:           changes.email,
      state:           changes.state,
    };
    self.store.update_student(student).await
  }

  /// Flip the active/inactive flag without touching the rest of the record.
  pub async fn change_state(&self, id: i64, state: bool) -> Result<Student> {
    let mut student = self.get(id).await?;
    student.state = state;
    self.store.update_student(student).await
  }

  pub async fn delete(&self, id: i64) -> Result<Student> {
    self.store.remove_student(id).await
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub struct SubjectService<S> {
  store: Arc<S>,
}

impl<S> Clone for SubjectService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: SubjectStore> SubjectService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn list(&self) -> Result<Vec<Subject>> {
    self.store.list_subjects().await
  }

  pub async fn get(&self, id: i64) -> Result<Subject> {
    self
      .store
      .get_subject(id)
      .await?
      .ok_or(Error::SubjectNotFound(id))
  }

  /// Create a subject. `available_slots` defaults to `slots`; an explicit
  /// value above `slots` is rejected.
  pub async fn create(&self, new: NewSubject) -> Result<Subject> {
    let available_slots = new.available_slots.unwrap_or(new.slots);
    if available_slots > new.slots {
      return Err(Error::InvalidSlotCounts {
        slots:     new.slots,
        available: available_slots,
      });
    }

    let subject = Subject {
      id: new.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
      name: new.name,
      code: new.code,
      credits: new.credits,
      slots: new.slots,
      available_slots,
      status: new.status,
    };
    self.store.add_subject(subject).await
  }

  /// Replace the subject at `id` with `changes` (any id inside the body is
  /// ignored). Overwrites `available_slots` as well, so callers hold the
  /// same invariant responsibility as with [`change_slots`](Self::change_slots).
  pub async fn update(&self, id: i64, changes: NewSubject) -> Result<Subject> {
    let available_slots = changes.available_slots.unwrap_or(changes.slots);
    if available_slots > changes.slots {
      return Err(Error::InvalidSlotCounts {
        slots:     changes.slots,
        available: available_slots,
      });
    }

    let subject = Subject {
      id,
      name: changes.name,
      code: changes.code,
      credits: changes.credits,
      slots: changes.slots,
      available_slots,
      status: changes.status,
    };
    self.store.update_subject(subject).await
  }

  /// Overwrite both slot counters, e.g. when a room change alters capacity.
  pub async fn change_slots(
    &self,
    id: i64,
    slots: u32,
    available_slots: u32,
  ) -> Result<Subject> {
    if available_slots > slots {
      return Err(Error::InvalidSlotCounts { slots, available: available_slots });
    }
    self.store.set_slot_counts(id, slots, available_slots).await
  }

  pub async fn delete(&self, id: i64) -> Result<Subject> {
    self.store.remove_subject(id).await
  }
}

// ─── Registrations ───────────────────────────────────────────────────────────

pub struct RegisterService<S> {
  store: Arc<S>,
}

impl<S> Clone for RegisterService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S> RegisterService<S>
where
  S: StudentStore + SubjectStore + RegistrationStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Every registration currently on record. No side effects.
  pub async fn list(&self) -> Result<Vec<Registration>> {
    self.store.list_registrations().await
  }

  /// Enroll a student in a subject.
  ///
  /// Both referents must exist, the pair must not already be enrolled, and
  /// the subject must have a free slot. The slot is claimed before the
  /// registration row is written, so a failed claim leaves no registration
  /// behind.
  pub async fn enroll(&self, new: NewRegistration) -> Result<Registration> {
    let NewRegistration { id_student, id_subject, date_register } = new;

    if self.store.get_student(id_student).await?.is_none() {
      return Err(Error::StudentNotFound(id_student));
    }
    if self.store.get_subject(id_subject).await?.is_none() {
      return Err(Error::SubjectNotFound(id_subject));
    }
    if self
      .store
      .get_registration(id_student, id_subject)
      .await?
      .is_some()
    {
      return Err(Error::RegistrationExists {
        student: id_student,
        subject: id_subject,
      });
    }

    self.store.claim_slot(id_subject).await?;

    let registration = Registration {
      id_student,
      id_subject,
      date_register: date_register.unwrap_or_else(Utc::now),
    };
    self.store.add_registration(registration).await
  }

  /// The subjects a student is enrolled in, fully resolved.
  pub async fn subjects_for_student(
    &self,
    student_id: i64,
  ) -> Result<Vec<Subject>> {
    if self.store.get_student(student_id).await?.is_none() {
      return Err(Error::StudentNotFound(student_id));
    }
    let ids = self.store.subject_ids_for_student(student_id).await?;
    self.store.list_subjects_by_ids(&ids).await
  }

  /// The students enrolled in a subject, fully resolved.
  pub async fn students_for_subject(
    &self,
    subject_id: i64,
  ) -> Result<Vec<Student>> {
    if self.store.get_subject(subject_id).await?.is_none() {
      return Err(Error::SubjectNotFound(subject_id));
    }
    let ids = self.store.student_ids_for_subject(subject_id).await?;
    self.store.list_students_by_ids(&ids).await
  }

  /// Remove an enrollment and return the freed slot to the subject.
  ///
  /// The registration must exist before the slot counter is touched;
  /// withdrawing a pair that was never enrolled fails without inflating
  /// capacity.
  pub async fn withdraw(
    &self,
    student_id: i64,
    subject_id: i64,
  ) -> Result<Registration> {
    if self.store.get_student(student_id).await?.is_none() {
      return Err(Error::StudentNotFound(student_id));
    }
    if self.store.get_subject(subject_id).await?.is_none() {
      return Err(Error::SubjectNotFound(subject_id));
    }
    if self
      .store
      .get_registration(student_id, subject_id)
      .await?
      .is_none()
    {
      return Err(Error::RegistrationNotFound {
        student: student_id,
        subject: subject_id,
      });
    }

    self.store.release_slot(subject_id).await?;
    self.store.remove_registration(student_id, subject_id).await
  }
}
