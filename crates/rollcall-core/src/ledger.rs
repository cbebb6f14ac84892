//! The attendance ledger: status lookup and the one-record-per-day write
//! rule.
//!
//! The record store enforces no composite uniqueness, so every write goes
//! through an existence check before branching into an insert or an update.
//! After a successful write the ledger refetches the user's full record set
//! from the store and hands that back; it never patches a local copy. The
//! caller's view is therefore always what the store holds, at the price of
//! one extra round trip per write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord},
  schedule::Occurrence,
  session::{self, Session},
  store::{AttendanceQuery, RecordStore},
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// The status recorded for `(subject_id, date)`, or `None` when unset.
///
/// Returns [`Error::ConsistencyFault`] when more than one record matches.
pub fn status_for(
  subject_id: Uuid,
  date: NaiveDate,
  records: &[AttendanceRecord],
) -> Result<Option<AttendanceStatus>> {
  let mut hits = records.iter().filter(|r| r.matches(subject_id, date));
  let Some(first) = hits.next() else {
    return Ok(None);
  };
  let extra = hits.count();
  if extra > 0 {
    let count = extra + 1;
    warn!(%subject_id, %date, count, "duplicate attendance records");
    return Err(Error::ConsistencyFault { subject_id, date, count });
  }
  Ok(Some(first.status))
}

/// The status recorded for an occurrence.
pub fn status_of(
  occurrence: &Occurrence,
  records: &[AttendanceRecord],
) -> Result<Option<AttendanceStatus>> {
  status_for(occurrence.subject_id(), occurrence.date, records)
}

/// An occurrence paired with its recorded status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedOccurrence {
  pub occurrence: Occurrence,
  pub status:     Option<AttendanceStatus>,
}

/// Pair every occurrence with its status, failing on the first consistency
/// fault.
pub fn annotate(
  occurrences: Vec<Occurrence>,
  records: &[AttendanceRecord],
) -> Result<Vec<AnnotatedOccurrence>> {
  occurrences
    .into_iter()
    .map(|occurrence| {
      let status = status_of(&occurrence, records)?;
      Ok(AnnotatedOccurrence { occurrence, status })
    })
    .collect()
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Whether a [`AttendanceLedger::mark`] created a record or changed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
  Insert,
  Update,
}

/// Result of a successful mark: the refetched record set and what changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marked {
  pub records: Vec<AttendanceRecord>,
  pub kind:    MutationKind,
}

/// Write access to attendance records through a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct AttendanceLedger<S> {
  store: S,
}

impl<S: RecordStore> AttendanceLedger<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Every record owned by the session's user, newest date first.
  pub async fn records(
    &self,
    session: Option<&Session>,
  ) -> Result<Vec<AttendanceRecord>> {
    let session = session::require(session)?;
    self
      .store
      .list_attendance(AttendanceQuery::for_user(session.user_id))
      .await
      .map_err(Error::persistence)
  }

  /// Existing records for one key; errors if the invariant is already
  /// broken.
  async fn existing(
    &self,
    session: &Session,
    subject_id: Uuid,
    date: NaiveDate,
  ) -> Result<Option<AttendanceRecord>> {
    let mut hits = self
      .store
      .list_attendance(AttendanceQuery::for_key(session.user_id, subject_id, date))
      .await
      .map_err(Error::persistence)?;
    match hits.len() {
      0 => Ok(None),
      1 => Ok(hits.pop()),
      count => {
        warn!(%subject_id, %date, count, "duplicate attendance records");
        Err(Error::ConsistencyFault { subject_id, date, count })
      }
    }
  }

  /// Record `status` for `(subject_id, date)`.
  ///
  /// Updates the existing record's status when one exists, otherwise inserts
  /// a new record. The existence check, the write and the refetch run
  /// strictly one after another. Store errors are returned unchanged and
  /// nothing is retried.
  pub async fn mark(
    &self,
    session: Option<&Session>,
    subject_id: Uuid,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> Result<Marked> {
    let session = session::require(session)?;

    let kind = match self.existing(session, subject_id, date).await? {
      Some(record) => {
        self
          .store
          .update_attendance_status(record.id, status)
          .await
          .map_err(Error::persistence)?;
        MutationKind::Update
      }
      None => {
        self
          .store
          .insert_attendance(NewAttendanceRecord {
            user_id: session.user_id,
            subject_id,
            date,
            status,
          })
          .await
          .map_err(Error::persistence)?;
        MutationKind::Insert
      }
    };
    debug!(%subject_id, %date, %status, ?kind, "attendance marked");

    let records = self.records(Some(session)).await?;
    Ok(Marked { records, kind })
  }

  /// Remove the record for `(subject_id, date)`, returning the occurrence to
  /// "unset". A missing record is not an error. Returns the refetched
  /// record set.
  pub async fn clear(
    &self,
    session: Option<&Session>,
    subject_id: Uuid,
    date: NaiveDate,
  ) -> Result<Vec<AttendanceRecord>> {
    let session = session::require(session)?;

    if let Some(record) = self.existing(session, subject_id, date).await? {
      self
        .store
        .delete_attendance(record.id)
        .await
        .map_err(Error::persistence)?;
      debug!(%subject_id, %date, "attendance cleared");
    }

    self.records(Some(session)).await
  }
}
