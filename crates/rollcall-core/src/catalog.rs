//! Subject management: add, edit and delete subject definitions.
//!
//! Follows the same write policy as the ledger: validate, write, then hand
//! back a fresh listing from the store.

use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  session::{self, Session},
  store::RecordStore,
  subject::{NewSubject, Subject, SubjectPatch},
};

/// Write access to a user's subjects through a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct SubjectCatalog<S> {
  store: S,
}

impl<S: RecordStore> SubjectCatalog<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// The session user's subjects, ordered by weekday then start time.
  pub async fn subjects(&self, session: Option<&Session>) -> Result<Vec<Subject>> {
    let session = session::require(session)?;
    self
      .store
      .list_subjects(session.user_id)
      .await
      .map_err(Error::persistence)
  }

  /// The session user's subject `id`, or a validation error if they own no
  /// such subject.
  async fn owned(&self, session: &Session, id: Uuid) -> Result<Subject> {
    self
      .subjects(Some(session))
      .await?
      .into_iter()
      .find(|s| s.id == id)
      .ok_or_else(|| Error::Validation(format!("unknown subject {id}")))
  }

  /// Validate and persist a new subject. Returns the created subject and the
  /// refetched catalog.
  pub async fn add(
    &self,
    session: Option<&Session>,
    input: NewSubject,
  ) -> Result<(Subject, Vec<Subject>)> {
    let session = session::require(session)?;
    let input = input.normalized()?;

    let created = self
      .store
      .insert_subject(session.user_id, input)
      .await
      .map_err(Error::persistence)?;
    debug!(subject_id = %created.id, name = %created.name, "subject added");

    let subjects = self.subjects(Some(session)).await?;
    Ok((created, subjects))
  }

  /// Apply `patch` to subject `id`. The patched subject is validated as a
  /// whole before anything is written.
  pub async fn update(
    &self,
    session: Option<&Session>,
    id: Uuid,
    patch: SubjectPatch,
  ) -> Result<Vec<Subject>> {
    let session = session::require(session)?;

    let current = self.owned(session, id).await?;

    let patched = patch.apply(&current).normalized()?;
    let patch = SubjectPatch {
      name:       Some(patched.name),
      short_name: patch.short_name.map(|_| patched.short_name),
      color:      patch.color.map(|_| patched.color),
      schedule:   patch.schedule,
      start_time: patch.start_time,
      end_time:   patch.end_time,
      room:       patch.room.map(|_| patched.room),
    };

    self
      .store
      .update_subject(session.user_id, id, patch)
      .await
      .map_err(Error::persistence)?;
    debug!(subject_id = %id, "subject updated");

    self.subjects(Some(session)).await
  }

  /// Delete subject `id`, which the session user must own. Attendance
  /// records that referenced it are left to the store; any that survive are
  /// orphans and count only towards overall statistics.
  pub async fn delete(&self, session: Option<&Session>, id: Uuid) -> Result<Vec<Subject>> {
    let session = session::require(session)?;
    self.owned(session, id).await?;

    self
      .store
      .delete_subject(session.user_id, id)
      .await
      .map_err(Error::persistence)?;
    debug!(subject_id = %id, "subject deleted");
    self.subjects(Some(session)).await
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;
  use crate::{
    attendance::AttendanceStatus,
    ledger::AttendanceLedger,
    memory::{Call, MemoryStore},
    subject::Schedule,
  };

  fn t(h: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, 0, 0).unwrap() }

  fn math(dow: u8, start: u32) -> NewSubject {
    NewSubject::new("Math", Schedule::Weekly { day_of_week: dow }, t(start), t(start + 1))
  }

  #[tokio::test]
  async fn add_requires_session() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let err = catalog.add(None, math(1, 9)).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationRequired));
    assert!(catalog.store().calls().is_empty());
  }

  #[tokio::test]
  async fn add_validates_before_writing() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());

    let mut blank = math(1, 9);
    blank.name = "  ".into();
    assert!(matches!(
      catalog.add(Some(&s), blank).await,
      Err(Error::Validation(_))
    ));

    let mut inverted = math(1, 9);
    inverted.end_time = t(8);
    assert!(matches!(
      catalog.add(Some(&s), inverted).await,
      Err(Error::Validation(_))
    ));

    assert!(catalog.store().calls().is_empty());
  }

  #[tokio::test]
  async fn add_refetches_ordered_catalog() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());

    catalog.add(Some(&s), math(3, 9)).await.unwrap();
    catalog.add(Some(&s), math(1, 11)).await.unwrap();
    let (created, subjects) = catalog.add(Some(&s), math(1, 8)).await.unwrap();

    assert_eq!(created.user_id, s.user_id);
    let order: Vec<_> = subjects
      .iter()
      .map(|s| (s.day_of_week(), s.start_time))
      .collect();
    assert_eq!(order, [(1, t(8)), (1, t(11)), (3, t(9))]);
    assert_eq!(
      catalog.store().calls().last(),
      Some(&Call::ListSubjects)
    );
  }

  #[tokio::test]
  async fn update_applies_validated_patch() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());
    let (created, _) = catalog.add(Some(&s), math(1, 9)).await.unwrap();

    let subjects = catalog
      .update(
        Some(&s),
        created.id,
        SubjectPatch {
          name: Some(" Algebra ".into()),
          room: Some(Some("B-12".into())),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    assert_eq!(subjects[0].name, "Algebra");
    assert_eq!(subjects[0].room.as_deref(), Some("B-12"));
    assert_eq!(subjects[0].start_time, t(9));
  }

  #[tokio::test]
  async fn update_rejects_invalid_result() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());
    let (created, _) = catalog.add(Some(&s), math(1, 9)).await.unwrap();

    let err = catalog
      .update(
        Some(&s),
        created.id,
        SubjectPatch { end_time: Some(t(7)), ..Default::default() },
      )
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!catalog.store().calls().contains(&Call::UpdateSubject));
  }

  #[tokio::test]
  async fn update_unknown_subject_is_rejected() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());
    let err = catalog
      .update(Some(&s), Uuid::new_v4(), SubjectPatch::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn extra_class_round_trip() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());
    let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    let input = NewSubject::new("Lab", Schedule::Extra { date }, t(14), t(16));

    let (created, _) = catalog.add(Some(&s), input).await.unwrap();
    assert!(created.is_extra());
    assert_eq!(created.extra_date(), Some(date));
    assert_eq!(created.day_of_week(), 6);
  }

  #[tokio::test]
  async fn delete_removes_subject() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let s = Session::new(Uuid::new_v4());
    let (created, _) = catalog.add(Some(&s), math(1, 9)).await.unwrap();

    let subjects = catalog.delete(Some(&s), created.id).await.unwrap();
    assert!(subjects.is_empty());
  }

  #[tokio::test]
  async fn catalog_and_ledger_share_a_store() {
    let store = std::sync::Arc::new(MemoryStore::default());
    let catalog = SubjectCatalog::new(store.clone());
    let ledger = AttendanceLedger::new(store);
    let s = Session::new(Uuid::new_v4());
    let (created, _) = catalog.add(Some(&s), math(1, 9)).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    ledger
      .mark(Some(&s), created.id, date, AttendanceStatus::Present)
      .await
      .unwrap();
    catalog.delete(Some(&s), created.id).await.unwrap();

    assert!(ledger.records(Some(&s)).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn delete_is_limited_to_own_subjects() {
    let store = std::sync::Arc::new(MemoryStore::default());
    let catalog = SubjectCatalog::new(store.clone());
    let ledger = AttendanceLedger::new(store.clone());
    let alice = Session::new(Uuid::new_v4());
    let bob = Session::new(Uuid::new_v4());

    let (created, _) = catalog.add(Some(&alice), math(1, 9)).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ledger
      .mark(Some(&alice), created.id, date, AttendanceStatus::Present)
      .await
      .unwrap();

    let err = catalog.delete(Some(&bob), created.id).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!store.calls().contains(&Call::DeleteSubject));

    assert_eq!(catalog.subjects(Some(&alice)).await.unwrap().len(), 1);
    assert_eq!(ledger.records(Some(&alice)).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_is_limited_to_own_subjects() {
    let catalog = SubjectCatalog::new(MemoryStore::default());
    let alice = Session::new(Uuid::new_v4());
    let bob = Session::new(Uuid::new_v4());
    let (created, _) = catalog.add(Some(&alice), math(1, 9)).await.unwrap();

    let err = catalog
      .update(
        Some(&bob),
        created.id,
        SubjectPatch { name: Some("Mine".into()), ..Default::default() },
      )
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(catalog.subjects(Some(&alice)).await.unwrap()[0].name, "Math");
  }
}
