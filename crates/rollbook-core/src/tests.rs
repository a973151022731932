//! Service tests against a HashMap-backed in-memory store.
//!
//! The services only see the store traits, so a trivial in-memory backend is
//! enough to exercise every enrollment rule without a database.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use crate::{
  Error, ErrorKind, Result,
  registration::{NewRegistration, Registration},
  services::{RegisterService, StudentService, SubjectService},
  store::{RegistrationStore, StudentStore, SubjectStore},
  student::{NewStudent, Student},
  subject::{NewSubject, Subject},
};

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
  students:      Mutex<HashMap<i64, Student>>,
  subjects:      Mutex<HashMap<i64, Subject>>,
  registrations: Mutex<Vec<Registration>>,
}

impl StudentStore for MemoryStore {
  async fn list_students(&self) -> Result<Vec<Student>> {
    Ok(self.students.lock().unwrap().values().cloned().collect())
  }

  async fn get_student(&self, id: i64) -> Result<Option<Student>> {
    Ok(self.students.lock().unwrap().get(&id).cloned())
  }

  async fn get_student_by_code(&self, code: &str) -> Result<Option<Student>> {
    Ok(
      self
        .students
        .lock()
        .unwrap()
        .values()
        .find(|s| s.student_code == code)
        .cloned(),
    )
  }

  async fn get_student_by_document(
    &self,
    doc_type: &str,
    doc_number: &str,
  ) -> Result<Option<Student>> {
    Ok(
      self
        .students
        .lock()
        .unwrap()
        .values()
        .find(|s| s.document_type == doc_type && s.document_number == doc_number)
        .cloned(),
    )
  }

  async fn list_students_by_ids(&self, ids: &[i64]) -> Result<Vec<Student>> {
    let students = self.students.lock().unwrap();
    Ok(ids.iter().filter_map(|id| students.get(id).cloned()).collect())
  }

  async fn add_student(&self, student: Student) -> Result<Student> {
    let mut students = self.students.lock().unwrap();
    if students.contains_key(&student.id) {
      return Err(Error::StudentExists(student.id));
    }
    if students.values().any(|s| s.student_code == student.student_code) {
      return Err(Error::StudentCodeTaken(student.student_code));
    }
    students.insert(student.id, student.clone());
    Ok(student)
  }

  async fn update_student(&self, student: Student) -> Result<Student> {
    let mut students = self.students.lock().unwrap();
    if !students.contains_key(&student.id) {
      return Err(Error::StudentNotFound(student.id));
    }
    students.insert(student.id, student.clone());
    Ok(student)
  }

  async fn remove_student(&self, id: i64) -> Result<Student> {
    self
      .students
      .lock()
      .unwrap()
      .remove(&id)
      .ok_or(Error::StudentNotFound(id))
  }
}

impl SubjectStore for MemoryStore {
  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    Ok(self.subjects.lock().unwrap().values().cloned().collect())
  }

  async fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
    Ok(self.subjects.lock().unwrap().get(&id).cloned())
  }

  async fn list_subjects_by_ids(&self, ids: &[i64]) -> Result<Vec<Subject>> {
    let subjects = self.subjects.lock().unwrap();
    Ok(ids.iter().filter_map(|id| subjects.get(id).cloned()).collect())
  }

  async fn add_subject(&self, subject: Subject) -> Result<Subject> {
    let mut subjects = self.subjects.lock().unwrap();
    if subjects.contains_key(&subject.id) {
      return Err(Error::SubjectExists(subject.id));
    }
    if subjects.values().any(|s| s.code == subject.code) {
      return Err(Error::SubjectCodeTaken(subject.code));
    }
    subjects.insert(subject.id, subject.clone());
    Ok(subject)
  }

  async fn update_subject(&self, subject: Subject) -> Result<Subject> {
    let mut subjects = self.subjects.lock().unwrap();
    if !subjects.contains_key(&subject.id) {
      return Err(Error::SubjectNotFound(subject.id));
    }
    subjects.insert(subject.id, subject.clone());
    Ok(subject)
  }

  async fn remove_subject(&self, id: i64) -> Result<Subject> {
    self
      .subjects
      .lock()
      .unwrap()
      .remove(&id)
      .ok_or(Error::SubjectNotFound(id))
  }

  async fn claim_slot(&self, id: i64) -> Result<Subject> {
    let mut subjects = self.subjects.lock().unwrap();
    let subject = subjects.get_mut(&id).ok_or(Error::SubjectNotFound(id))?;
    if subject.available_slots == 0 {
      return Err(Error::SubjectExhausted(id));
    }
    subject.available_slots -= 1;
    Ok(subject.clone())
  }

  async fn release_slot(&self, id: i64) -> Result<Subject> {
    let mut subjects = self.subjects.lock().unwrap();
    let subject = subjects.get_mut(&id).ok_or(Error::SubjectNotFound(id))?;
    if subject.available_slots >= subject.slots {
      return Err(Error::SubjectAtCapacity(id));
    }
    subject.available_slots += 1;
    Ok(subject.clone())
  }

  async fn set_slot_counts(
    &self,
    id: i64,
    slots: u32,
    available_slots: u32,
  ) -> Result<Subject> {
    let mut subjects = self.subjects.lock().unwrap();
    let subject = subjects.get_mut(&id).ok_or(Error::SubjectNotFound(id))?;
    subject.slots = slots;
    subject.available_slots = available_slots;
    Ok(subject.clone())
  }
}

impl RegistrationStore for MemoryStore {
  async fn list_registrations(&self) -> Result<Vec<Registration>> {
    Ok(self.registrations.lock().unwrap().clone())
  }

  async fn get_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> Result<Option<Registration>> {
    Ok(
      self
        .registrations
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.id_student == student && r.id_subject == subject)
        .cloned(),
    )
  }

  async fn add_registration(
    &self,
    registration: Registration,
  ) -> Result<Registration> {
    self.registrations.lock().unwrap().push(registration.clone());
    Ok(registration)
  }

  async fn remove_registration(
    &self,
    student: i64,
    subject: i64,
  ) -> Result<Registration> {
    let mut registrations = self.registrations.lock().unwrap();
    let index = registrations
      .iter()
      .position(|r| r.id_student == student && r.id_subject == subject)
      .ok_or(Error::RegistrationNotFound { student, subject })?;
    Ok(registrations.remove(index))
  }

  async fn subject_ids_for_student(&self, student: i64) -> Result<Vec<i64>> {
    Ok(
      self
        .registrations
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.id_student == student)
        .map(|r| r.id_subject)
        .collect(),
    )
  }

  async fn student_ids_for_subject(&self, subject: i64) -> Result<Vec<i64>> {
    Ok(
      self
        .registrations
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.id_subject == subject)
        .map(|r| r.id_student)
        .collect(),
    )
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

type Services = (
  StudentService<MemoryStore>,
  SubjectService<MemoryStore>,
  RegisterService<MemoryStore>,
);

fn services() -> Services {
  let store = Arc::new(MemoryStore::default());
  (
    StudentService::new(Arc::clone(&store)),
    SubjectService::new(Arc::clone(&store)),
    RegisterService::new(store),
  )
}

fn new_student(id: i64) -> NewStudent {
  NewStudent {
    id:              Some(id),
    document_number: format!("10{id}"),
    document_type:   "CC".into(),
    name:            "Alice".into(),
    surname:         "Liddell".into(),
    student_code:    format!("STU-{id}"),
    email:           "alice@example.edu".into(),
    state:           true,
  }
}

fn new_subject(id: i64, slots: u32) -> NewSubject {
  NewSubject {
    id:              Some(id),
    name:            "Databases".into(),
    code:            format!("DB-{id}"),
    credits:         3,
    slots,
    available_slots: None,
    status:          true,
  }
}

fn enrollment(student: i64, subject: i64) -> NewRegistration {
  NewRegistration {
    id_student:    student,
    id_subject:    subject,
    date_register: None,
  }
}

// ─── Enrollment rules ────────────────────────────────────────────────────────

#[tokio::test]
async fn enroll_claims_one_slot_and_withdraw_returns_it() {
  let (students, subjects, registers) = services();
  students.create(new_student(42)).await.unwrap();
  subjects.create(new_subject(2, 3)).await.unwrap();

  registers.enroll(enrollment(42, 2)).await.unwrap();
  assert_eq!(subjects.get(2).await.unwrap().available_slots, 2);

  let all = registers.list().await.unwrap();
  assert!(all.iter().any(|r| r.id_student == 42 && r.id_subject == 2));

  registers.withdraw(42, 2).await.unwrap();
  assert_eq!(subjects.get(2).await.unwrap().available_slots, 3);
  assert!(registers.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn enroll_unknown_student_touches_nothing() {
  let (_, subjects, registers) = services();
  subjects.create(new_subject(2, 3)).await.unwrap();

  let err = registers.enroll(enrollment(99, 2)).await.unwrap_err();
  assert!(matches!(err, Error::StudentNotFound(99)));

  assert_eq!(subjects.get(2).await.unwrap().available_slots, 3);
  assert!(registers.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn enroll_unknown_subject_is_not_found() {
  let (students, _, registers) = services();
  students.create(new_student(42)).await.unwrap();

  let err = registers.enroll(enrollment(42, 7)).await.unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(7)));
}

#[tokio::test]
async fn enroll_duplicate_pair_is_conflict_and_leaves_slots() {
  let (students, subjects, registers) = services();
  students.create(new_student(42)).await.unwrap();
  subjects.create(new_subject(2, 3)).await.unwrap();

  registers.enroll(enrollment(42, 2)).await.unwrap();
  let err = registers.enroll(enrollment(42, 2)).await.unwrap_err();
  assert!(matches!(err, Error::RegistrationExists { student: 42, subject: 2 }));
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert_eq!(subjects.get(2).await.unwrap().available_slots, 2);
  assert_eq!(registers.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn enroll_exhausted_subject_fails_without_registration() {
  let (students, subjects, registers) = services();
  students.create(new_student(1)).await.unwrap();
  students.create(new_student(2)).await.unwrap();
  subjects.create(new_subject(5, 1)).await.unwrap();

  registers.enroll(enrollment(1, 5)).await.unwrap();
  let err = registers.enroll(enrollment(2, 5)).await.unwrap_err();
  assert!(matches!(err, Error::SubjectExhausted(5)));

  let subject = subjects.get(5).await.unwrap();
  assert_eq!(subject.available_slots, 0);
  assert_eq!(registers.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn withdraw_unregistered_pair_fails_without_releasing() {
  let (students, subjects, registers) = services();
  students.create(new_student(1)).await.unwrap();
  students.create(new_student(2)).await.unwrap();
  subjects.create(new_subject(5, 3)).await.unwrap();

  registers.enroll(enrollment(1, 5)).await.unwrap();
  let err = registers.withdraw(2, 5).await.unwrap_err();
  assert!(matches!(err, Error::RegistrationNotFound { student: 2, subject: 5 }));

  // The counter must not drift upward from a withdrawal that deleted nothing.
  assert_eq!(subjects.get(5).await.unwrap().available_slots, 2);
}

#[tokio::test]
async fn joins_resolve_full_entities_on_both_sides() {
  let (students, subjects, registers) = services();
  students.create(new_student(1)).await.unwrap();
  students.create(new_student(2)).await.unwrap();
  subjects.create(new_subject(10, 5)).await.unwrap();
  subjects.create(new_subject(11, 5)).await.unwrap();

  registers.enroll(enrollment(1, 10)).await.unwrap();
  registers.enroll(enrollment(1, 11)).await.unwrap();
  registers.enroll(enrollment(2, 10)).await.unwrap();

  let mut enrolled = registers.subjects_for_student(1).await.unwrap();
  enrolled.sort_by_key(|s| s.id);
  assert_eq!(enrolled.iter().map(|s| s.id).collect::<Vec<_>>(), vec![10, 11]);
  assert_eq!(enrolled[0].code, "DB-10");

  let mut takers = registers.students_for_subject(10).await.unwrap();
  takers.sort_by_key(|s| s.id);
  assert_eq!(takers.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
  assert_eq!(takers[0].student_code, "STU-1");
}

#[tokio::test]
async fn join_on_unknown_referent_is_not_found() {
  let (_, _, registers) = services();
  assert!(matches!(
    registers.subjects_for_student(1).await.unwrap_err(),
    Error::StudentNotFound(1)
  ));
  assert!(matches!(
    registers.students_for_subject(1).await.unwrap_err(),
    Error::SubjectNotFound(1)
  ));
}

// ─── Student service ─────────────────────────────────────────────────────────

#[tokio::test]
async fn student_create_without_id_derives_timestamp_id() {
  let (students, _, _) = services();
  let mut new = new_student(0);
  new.id = None;

  let created = students.create(new).await.unwrap();
  // Epoch millis for any plausible clock: 13 digits.
  assert!(created.id > 1_000_000_000_000);
  assert_eq!(students.get(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn student_lookups_by_natural_keys() {
  let (students, _, _) = services();
  students.create(new_student(7)).await.unwrap();

  assert_eq!(students.get_by_code("STU-7").await.unwrap().id, 7);
  assert_eq!(students.get_by_document("CC", "107").await.unwrap().id, 7);

  let err = students.get_by_code("STU-404").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = students.get_by_document("TI", "107").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn student_change_state_preserves_the_rest() {
  let (students, _, _) = services();
  let created = students.create(new_student(7)).await.unwrap();

  let updated = students.change_state(7, false).await.unwrap();
  assert!(!updated.state);
  assert_eq!(updated.student_code, created.student_code);
  assert_eq!(updated.email, created.email);
}

#[tokio::test]
async fn student_duplicate_id_and_code_are_conflicts() {
  let (students, _, _) = services();
  students.create(new_student(7)).await.unwrap();

  let err = students.create(new_student(7)).await.unwrap_err();
  assert!(matches!(err, Error::StudentExists(7)));

  let mut clash = new_student(8);
  clash.student_code = "STU-7".into();
  let err = students.create(clash).await.unwrap_err();
  assert!(matches!(err, Error::StudentCodeTaken(_)));
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

// ─── Subject service ─────────────────────────────────────────────────────────

#[tokio::test]
async fn subject_create_defaults_available_to_slots() {
  let (_, subjects, _) = services();
  let created = subjects.create(new_subject(3, 25)).await.unwrap();
  assert_eq!(created.slots, 25);
  assert_eq!(created.available_slots, 25);
}

#[tokio::test]
async fn subject_invalid_slot_counts_are_bad_requests() {
  let (_, subjects, _) = services();
  let mut new = new_subject(3, 10);
  new.available_slots = Some(11);

  let err = subjects.create(new).await.unwrap_err();
  assert!(matches!(err, Error::InvalidSlotCounts { slots: 10, available: 11 }));
  assert_eq!(err.kind(), ErrorKind::BadRequest);

  subjects.create(new_subject(3, 10)).await.unwrap();
  let err = subjects.change_slots(3, 5, 6).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn subject_change_slots_overwrites_both_counters() {
  let (_, subjects, _) = services();
  subjects.create(new_subject(3, 10)).await.unwrap();

  let updated = subjects.change_slots(3, 30, 12).await.unwrap();
  assert_eq!(updated.slots, 30);
  assert_eq!(updated.available_slots, 12);
}

#[tokio::test]
async fn subject_delete_then_get_is_not_found() {
  let (_, subjects, _) = services();
  subjects.create(new_subject(3, 10)).await.unwrap();

  let deleted = subjects.delete(3).await.unwrap();
  assert_eq!(deleted.id, 3);
  assert!(matches!(
    subjects.get(3).await.unwrap_err(),
    Error::SubjectNotFound(3)
  ));
}

// ─── Error classification ────────────────────────────────────────────────────

#[test]
fn error_kinds_map_to_the_http_table() {
  assert_eq!(Error::StudentNotFound(1).kind(), ErrorKind::NotFound);
  assert_eq!(
    Error::RegistrationNotFound { student: 1, subject: 2 }.kind(),
    ErrorKind::NotFound
  );
  assert_eq!(
    Error::RegistrationExists { student: 1, subject: 2 }.kind(),
    ErrorKind::Conflict
  );
  assert_eq!(Error::SubjectExhausted(1).kind(), ErrorKind::Conflict);
  assert_eq!(Error::SubjectAtCapacity(1).kind(), ErrorKind::Conflict);
  assert_eq!(
    Error::InvalidSlotCounts { slots: 1, available: 2 }.kind(),
    ErrorKind::BadRequest
  );
  assert_eq!(
    Error::store(std::io::Error::other("disk on fire")).kind(),
    ErrorKind::Internal
  );
}
