//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rollcall_core::{
  attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord},
  profile::Profile,
  store::{AttendanceQuery, RecordStore},
  subject::{NewSubject, Subject, SubjectPatch},
};

use crate::{
  encode::{
    encode_date, encode_schedule, encode_status, encode_time, encode_uuid,
    RawProfile, RawRecord, RawSubject, PROFILE_COLUMNS, RECORD_COLUMNS, SUBJECT_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
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

  /// Open an in-memory store.
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

  async fn get_subject(&self, user_id: Uuid, id: Uuid) -> Result<Option<Subject>> {
    let id_str   = encode_uuid(id);
    let user_str = encode_uuid(user_id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![id_str, user_str],
            RawSubject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  /// Write every mutable column of `subject` back to its row.
  async fn write_subject(&self, subject: &Subject) -> Result<usize> {
    let id_str                           = encode_uuid(subject.id);
    let user_str                         = encode_uuid(subject.user_id);
    let name                             = subject.name.clone();
    let short_name                       = subject.short_name.clone();
    let color                            = subject.color.clone();
    let (is_extra, day_of_week, extra)   = encode_schedule(subject.schedule);
    let start_str                        = encode_time(subject.start_time);
    let end_str                          = encode_time(subject.end_time);
    let room                             = subject.room.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET
             name = ?2, short_name = ?3, color = ?4, day_of_week = ?5,
             start_time = ?6, end_time = ?7, room = ?8,
             is_extra = ?9, extra_date = ?10
           WHERE id = ?1 AND user_id = ?11",
          rusqlite::params![
            id_str,
            name,
            short_name,
            color,
            day_of_week,
            start_str,
            end_str,
            room,
            is_extra,
            extra,
            user_str,
          ],
        )?)
      })
      .await?;
    Ok(changed)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn list_subjects(&self, user_id: Uuid) -> Result<Vec<Subject>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects
           WHERE user_id = ?1
           ORDER BY day_of_week, start_time, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn insert_subject(&self, user_id: Uuid, input: NewSubject) -> Result<Subject> {
    let subject = input.into_subject(Uuid::new_v4(), user_id);

    let id_str                         = encode_uuid(subject.id);
    let user_str                       = encode_uuid(user_id);
    let name                           = subject.name.clone();
    let short_name                     = subject.short_name.clone();
    let color                          = subject.color.clone();
    let (is_extra, day_of_week, extra) = encode_schedule(subject.schedule);
    let start_str                      = encode_time(subject.start_time);
    let end_str                        = encode_time(subject.end_time);
    let room                           = subject.room.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO subjects ({SUBJECT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
          ),
          rusqlite::params![
            id_str,
            user_str,
            name,
            short_name,
            color,
            day_of_week,
            start_str,
            end_str,
            room,
            is_extra,
            extra,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn update_subject(&self, user_id: Uuid, id: Uuid, patch: SubjectPatch) -> Result<()> {
    let current = self
      .get_subject(user_id, id)
      .await?
      .ok_or(Error::SubjectNotFound(id))?;

    if patch.is_empty() {
      return Ok(());
    }

    let updated = patch.apply(&current);
    if self.write_subject(&updated).await? == 0 {
      // Deleted between the read and the write.
      return Err(Error::SubjectNotFound(id));
    }
    Ok(())
  }

  async fn delete_subject(&self, user_id: Uuid, id: Uuid) -> Result<()> {
    let id_str   = encode_uuid(id);
    let user_str = encode_uuid(user_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subjects WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;

    tracing::debug!(%id, %user_id, removed, "deleted subject");
    Ok(())
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn list_attendance(&self, query: AttendanceQuery) -> Result<Vec<AttendanceRecord>> {
    let mut sql = format!(
      "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE user_id = ?1"
    );
    let mut args = vec![encode_uuid(query.user_id)];

    if let Some(subject_id) = query.subject_id {
      args.push(encode_uuid(subject_id));
      sql.push_str(&format!(" AND subject_id = ?{}", args.len()));
    }
    if let Some(date) = query.date {
      args.push(encode_date(date));
      sql.push_str(&format!(" AND date = ?{}", args.len()));
    }
    sql.push_str(" ORDER BY date DESC, rowid");

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn insert_attendance(&self, input: NewAttendanceRecord) -> Result<AttendanceRecord> {
    let record = input.into_record(Uuid::new_v4());

    let id_str      = encode_uuid(record.id);
    let user_str    = encode_uuid(record.user_id);
    let subject_str = encode_uuid(record.subject_id);
    let date_str    = encode_date(record.date);
    let status_str  = encode_status(record.status);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO attendance_records ({RECORD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5)"
          ),
          rusqlite::params![id_str, user_str, subject_str, date_str, status_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn update_attendance_status(&self, id: Uuid, status: AttendanceStatus) -> Result<()> {
    let id_str     = encode_uuid(id);
    let status_str = encode_status(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE attendance_records SET status = ?2 WHERE id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RecordNotFound(id));
    }
    Ok(())
  }

  async fn delete_attendance(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM attendance_records WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let user_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
            rusqlite::params![user_str],
            RawProfile::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn upsert_profile(&self, profile: Profile) -> Result<()> {
    let user_str = encode_uuid(profile.user_id);
    let Profile { full_name, roll_number, semester, department, .. } = profile;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET
               full_name   = excluded.full_name,
               roll_number = excluded.roll_number,
               semester    = excluded.semester,
               department  = excluded.department"
          ),
          rusqlite::params![user_str, full_name, roll_number, semester, department],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
