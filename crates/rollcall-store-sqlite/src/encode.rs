//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, times of day as zero-padded
//! `HH:MM:SS` (so lexical order is chronological), UUIDs as hyphenated
//! lowercase strings and statuses as their lowercase names.

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::{
  attendance::{AttendanceRecord, AttendanceStatus},
  profile::Profile,
  subject::{Schedule, Subject},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Parse(format!("date {s:?}: {e}")))
}

// ─── NaiveTime ────────────────────────────────────────────────────────────────

const TIME_FORMAT: &str = "%H:%M:%S";

pub fn encode_time(time: NaiveTime) -> String { time.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT)
    .map_err(|e| Error::Parse(format!("time {s:?}: {e}")))
}

// ─── AttendanceStatus ─────────────────────────────────────────────────────────

pub fn encode_status(status: AttendanceStatus) -> String { status.to_string() }

pub fn decode_status(s: &str) -> Result<AttendanceStatus> {
  s.parse()
    .map_err(|_| Error::Parse(format!("unknown attendance status: {s:?}")))
}

// ─── Schedule ─────────────────────────────────────────────────────────────────

/// `(is_extra, day_of_week, extra_date)` column values.
pub fn encode_schedule(schedule: Schedule) -> (bool, u8, Option<String>) {
  (
    schedule.is_extra(),
    schedule.day_of_week(),
    schedule.extra_date().map(encode_date),
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SUBJECT_COLUMNS: &str = "id, user_id, name, short_name, color, \
   day_of_week, start_time, end_time, room, is_extra, extra_date";

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub id:          String,
  pub user_id:     String,
  pub name:        String,
  pub short_name:  Option<String>,
  pub color:       String,
  pub day_of_week: u8,
  pub start_time:  String,
  pub end_time:    String,
  pub room:        Option<String>,
  pub is_extra:    bool,
  pub extra_date:  Option<String>,
}

impl RawSubject {
  /// Read a row selected with [`SUBJECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      name:        row.get(2)?,
      short_name:  row.get(3)?,
      color:       row.get(4)?,
      day_of_week: row.get(5)?,
      start_time:  row.get(6)?,
      end_time:    row.get(7)?,
      room:        row.get(8)?,
      is_extra:    row.get(9)?,
      extra_date:  row.get(10)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    let extra_date = self.extra_date.as_deref().map(decode_date).transpose()?;
    Ok(Subject {
      id:         decode_uuid(&self.id)?,
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      short_name: self.short_name,
      color:      self.color,
      schedule:   Schedule::from_parts(self.is_extra, self.day_of_week, extra_date)?,
      start_time: decode_time(&self.start_time)?,
      end_time:   decode_time(&self.end_time)?,
      room:       self.room,
    })
  }
}

pub const RECORD_COLUMNS: &str = "id, user_id, subject_id, date, status";

/// Raw strings read directly from an `attendance_records` row.
pub struct RawRecord {
  pub id:         String,
  pub user_id:    String,
  pub subject_id: String,
  pub date:       String,
  pub status:     String,
}

impl RawRecord {
  /// Read a row selected with [`RECORD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      subject_id: row.get(2)?,
      date:       row.get(3)?,
      status:     row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      id:         decode_uuid(&self.id)?,
      user_id:    decode_uuid(&self.user_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      date:       decode_date(&self.date)?,
      status:     decode_status(&self.status)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str =
  "user_id, full_name, roll_number, semester, department";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:     String,
  pub full_name:   Option<String>,
  pub roll_number: Option<String>,
  pub semester:    Option<String>,
  pub department:  Option<String>,
}

impl RawProfile {
  /// Read a row selected with [`PROFILE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      full_name:   row.get(1)?,
      roll_number: row.get(2)?,
      semester:    row.get(3)?,
      department:  row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:     decode_uuid(&self.user_id)?,
      full_name:   self.full_name,
      roll_number: self.roll_number,
      semester:    self.semester,
      department:  self.department,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn times_are_zero_padded() {
    let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
    assert_eq!(encode_time(t), "09:05:00");
    assert_eq!(decode_time("09:05:00").unwrap(), t);
  }

  #[test]
  fn bad_status_is_a_parse_error() {
    assert!(matches!(decode_status("late"), Err(Error::Parse(_))));
    assert_eq!(decode_status("absent").unwrap(), AttendanceStatus::Absent);
  }

  #[test]
  fn extra_schedule_columns() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    assert_eq!(
      encode_schedule(Schedule::Extra { date }),
      (true, 6, Some("2024-01-06".to_owned()))
    );
    assert_eq!(
      encode_schedule(Schedule::Weekly { day_of_week: 2 }),
      (false, 2, None)
    );
  }
}
