//! Registration — the enrollment link between one student and one subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One active enrollment, keyed by the `(id_student, id_subject)` pair.
/// No duplicate pair may exist. A registration does not own either entity;
/// both sides are held as plain numeric id references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub id_student:    i64,
  pub id_subject:    i64,
  pub date_register: DateTime<Utc>,
}

/// Input for [`RegisterService::enroll`](crate::services::RegisterService::enroll).
/// `date_register` (also accepted as `date` on the wire) defaults to the
/// current time when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
  pub id_student:    i64,
  pub id_subject:    i64,
  #[serde(default, alias = "date")]
  pub date_register: Option<DateTime<Utc>>,
}
