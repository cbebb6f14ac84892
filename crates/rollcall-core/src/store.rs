//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). The ledger and catalog depend on this
//! abstraction, not on any concrete backend. Stores are plain record CRUD:
//! they enforce no composite uniqueness and offer no transactions.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord},
  profile::Profile,
  subject::{NewSubject, Subject, SubjectPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filter for [`RecordStore::list_attendance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceQuery {
  pub user_id:    Uuid,
  pub subject_id: Option<Uuid>,
  pub date:       Option<NaiveDate>,
}

impl AttendanceQuery {
  /// Every record owned by `user_id`.
  pub fn for_user(user_id: Uuid) -> Self {
    Self { user_id, subject_id: None, date: None }
  }

  /// The records for one `(user, subject, date)` key; at most one if the
  /// ledger invariant holds.
  pub fn for_key(user_id: Uuid, subject_id: Uuid, date: NaiveDate) -> Self {
    Self { user_id, subject_id: Some(subject_id), date: Some(date) }
  }

  pub fn matches(&self, record: &AttendanceRecord) -> bool {
    record.user_id == self.user_id
      && self.subject_id.is_none_or(|id| record.subject_id == id)
      && self.date.is_none_or(|d| record.date == d)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a record store backend holding subjects and attendance
/// records, both keyed by owning user.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// All subjects owned by `user_id`, ordered by day-of-week then start
  /// time.
  fn list_subjects(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Persist a new subject. The store assigns its identifier.
  fn insert_subject(
    &self,
    user_id: Uuid,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Apply `patch` to subject `id` if `user_id` owns it.
  fn update_subject(
    &self,
    user_id: Uuid,
    id: Uuid,
    patch: SubjectPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete subject `id` if `user_id` owns it. Deleting a subject the user
  /// does not own (or that does not exist) changes nothing.
  fn delete_subject(
    &self,
    user_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Records matching `query`, newest date first.
  fn list_attendance(
    &self,
    query: AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  /// Persist a new record. The store assigns its identifier. Stores that
  /// hold subjects reject a record whose subject belongs to another user.
  fn insert_attendance(
    &self,
    input: NewAttendanceRecord,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  /// Overwrite the status of record `id`. No other field is mutable.
  fn update_attendance_status(
    &self,
    id: Uuid,
    status: AttendanceStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_attendance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Insert or replace the profile keyed by `profile.user_id`.
  fn upsert_profile(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Shared handles ──────────────────────────────────────────────────────────

/// Lets the ledger and the catalog share one backend.
impl<T: RecordStore> RecordStore for std::sync::Arc<T> {
  type Error = T::Error;

  fn list_subjects(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_ {
    (**self).list_subjects(user_id)
  }

  fn insert_subject(
    &self,
    user_id: Uuid,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_ {
    (**self).insert_subject(user_id, input)
  }

  fn update_subject(
    &self,
    user_id: Uuid,
    id: Uuid,
    patch: SubjectPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).update_subject(user_id, id, patch)
  }

  fn delete_subject(
    &self,
    user_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).delete_subject(user_id, id)
  }

  fn list_attendance(
    &self,
    query: AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_ {
    (**self).list_attendance(query)
  }

  fn insert_attendance(
    &self,
    input: NewAttendanceRecord,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_ {
    (**self).insert_attendance(input)
  }

  fn update_attendance_status(
    &self,
    id: Uuid,
    status: AttendanceStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).update_attendance_status(id, status)
  }

  fn delete_attendance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).delete_attendance(id)
  }

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_ {
    (**self).get_profile(user_id)
  }

  fn upsert_profile(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).upsert_profile(profile)
  }
}
