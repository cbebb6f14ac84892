//! In-memory [`RecordStore`] used by the unit tests. Records every call and
//! can be told to fail a given operation.

use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::{
  attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord},
  profile::Profile,
  store::{AttendanceQuery, RecordStore},
  subject::{NewSubject, Subject, SubjectPatch},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
  ListSubjects,
  InsertSubject,
  UpdateSubject,
  DeleteSubject,
  ListAttendance,
  InsertAttendance,
  UpdateAttendance,
  DeleteAttendance,
  GetProfile,
  UpsertProfile,
}

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("injected failure on {0:?}")]
  Injected(Call),
  #[error("no such row: {0}")]
  NotFound(Uuid),
  #[error("subject {0} belongs to another user")]
  ForeignSubject(Uuid),
}

#[derive(Default)]
struct Inner {
  subjects: Vec<Subject>,
  records:  Vec<AttendanceRecord>,
  profiles: Vec<Profile>,
  calls:    Vec<Call>,
  fail_on:  Option<Call>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn calls(&self) -> Vec<Call> { self.inner.lock().unwrap().calls.clone() }

  pub fn fail_on(&self, call: Call) { self.inner.lock().unwrap().fail_on = Some(call); }

  /// Insert a record directly, bypassing the ledger.
  pub fn seed(&self, record: AttendanceRecord) {
    self.inner.lock().unwrap().records.push(record);
  }

  fn enter(&self, call: Call) -> Result<std::sync::MutexGuard<'_, Inner>, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push(call);
    if inner.fail_on == Some(call) {
      return Err(MemoryError::Injected(call));
    }
    Ok(inner)
  }
}

impl RecordStore for MemoryStore {
  type Error = MemoryError;

  async fn list_subjects(&self, user_id: Uuid) -> Result<Vec<Subject>, MemoryError> {
    let inner = self.enter(Call::ListSubjects)?;
    let mut out: Vec<Subject> = inner
      .subjects
      .iter()
      .filter(|s| s.user_id == user_id)
      .cloned()
      .collect();
    out.sort_by_key(|s| (s.day_of_week(), s.start_time));
    Ok(out)
  }

  async fn insert_subject(
    &self,
    user_id: Uuid,
    input: NewSubject,
  ) -> Result<Subject, MemoryError> {
    let mut inner = self.enter(Call::InsertSubject)?;
    let subject = input.into_subject(Uuid::new_v4(), user_id);
    inner.subjects.push(subject.clone());
    Ok(subject)
  }

  async fn update_subject(
    &self,
    user_id: Uuid,
    id: Uuid,
    patch: SubjectPatch,
  ) -> Result<(), MemoryError> {
    let mut inner = self.enter(Call::UpdateSubject)?;
    let subject = inner
      .subjects
      .iter_mut()
      .find(|s| s.id == id && s.user_id == user_id)
      .ok_or(MemoryError::NotFound(id))?;
    *subject = patch.apply(subject);
    Ok(())
  }

  async fn delete_subject(&self, user_id: Uuid, id: Uuid) -> Result<(), MemoryError> {
    let mut inner = self.enter(Call::DeleteSubject)?;
    let before = inner.subjects.len();
    inner.subjects.retain(|s| !(s.id == id && s.user_id == user_id));
    if inner.subjects.len() < before {
      inner.records.retain(|r| r.subject_id != id);
    }
    Ok(())
  }

  async fn list_attendance(
    &self,
    query: AttendanceQuery,
  ) -> Result<Vec<AttendanceRecord>, MemoryError> {
    let inner = self.enter(Call::ListAttendance)?;
    let mut out: Vec<AttendanceRecord> = inner
      .records
      .iter()
      .filter(|r| query.matches(r))
      .cloned()
      .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(out)
  }

  async fn insert_attendance(
    &self,
    input: NewAttendanceRecord,
  ) -> Result<AttendanceRecord, MemoryError> {
    let mut inner = self.enter(Call::InsertAttendance)?;
    // Unknown subjects are allowed so tests can seed bare records.
    if inner
      .subjects
      .iter()
      .any(|s| s.id == input.subject_id && s.user_id != input.user_id)
    {
      return Err(MemoryError::ForeignSubject(input.subject_id));
    }
    let record = input.into_record(Uuid::new_v4());
    inner.records.push(record.clone());
    Ok(record)
  }

  async fn update_attendance_status(
    &self,
    id: Uuid,
    status: AttendanceStatus,
  ) -> Result<(), MemoryError> {
    let mut inner = self.enter(Call::UpdateAttendance)?;
    let record = inner
      .records
      .iter_mut()
      .find(|r| r.id == id)
      .ok_or(MemoryError::NotFound(id))?;
    record.status = status;
    Ok(())
  }

  async fn delete_attendance(&self, id: Uuid) -> Result<(), MemoryError> {
    let mut inner = self.enter(Call::DeleteAttendance)?;
    inner.records.retain(|r| r.id != id);
    Ok(())
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, MemoryError> {
    let inner = self.enter(Call::GetProfile)?;
    Ok(inner.profiles.iter().find(|p| p.user_id == user_id).cloned())
  }

  async fn upsert_profile(&self, profile: Profile) -> Result<(), MemoryError> {
    let mut inner = self.enter(Call::UpsertProfile)?;
    inner.profiles.retain(|p| p.user_id != profile.user_id);
    inner.profiles.push(profile);
    Ok(())
  }
}
