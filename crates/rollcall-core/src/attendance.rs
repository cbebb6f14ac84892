//! Attendance records: one status per subject per date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The recorded outcome of one class meeting.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
  Present,
  Absent,
  /// The class did not take place. Excluded from totals and percentages.
  Cancelled,
}

/// A persisted attendance record.
///
/// Only `status` may change after creation; the rest of the record is its
/// identity. At most one record exists per `(user_id, subject_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub id:         Uuid,
  pub user_id:    Uuid,
  pub subject_id: Uuid,
  pub date:       NaiveDate,
  pub status:     AttendanceStatus,
}

impl AttendanceRecord {
  pub fn matches(&self, subject_id: Uuid, date: NaiveDate) -> bool {
    self.subject_id == subject_id && self.date == date
  }
}

/// Input to [`crate::store::RecordStore::insert_attendance`]. The store
/// assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendanceRecord {
  pub user_id:    Uuid,
  pub subject_id: Uuid,
  pub date:       NaiveDate,
  pub status:     AttendanceStatus,
}

impl NewAttendanceRecord {
  pub fn into_record(self, id: Uuid) -> AttendanceRecord {
    AttendanceRecord {
      id,
      user_id: self.user_id,
      subject_id: self.subject_id,
      date: self.date,
      status: self.status,
    }
  }
}
