//! Subject: a scheduled class definition.
//!
//! A subject either recurs weekly on a fixed weekday or is pinned to one
//! calendar date (an "extra" class). The two cases are modelled by
//! [`Schedule`] so a subject can never be both.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Colour tokens offered to users when creating a subject.
pub const PALETTE: [&str; 11] = [
  "#6366f1", "#8b5cf6", "#d946ef", "#ec4899", "#f43f5e", "#f97316",
  "#eab308", "#22c55e", "#14b8a6", "#06b6d4", "#3b82f6",
];

pub const DEFAULT_COLOR: &str = PALETTE[0];

/// Weekday names indexed by day-of-week (0 = Sunday).
pub const WEEKDAYS: [&str; 7] = [
  "Sunday",
  "Monday",
  "Tuesday",
  "Wednesday",
  "Thursday",
  "Friday",
  "Saturday",
];

/// Day-of-week of `date`, 0 = Sunday.
pub fn day_of_week(date: NaiveDate) -> u8 {
  date.weekday().num_days_from_sunday() as u8
}

// ─── Schedule ────────────────────────────────────────────────────────────────

/// When a subject meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
  /// Recurs every week on `day_of_week` (0 = Sunday … 6 = Saturday).
  Weekly { day_of_week: u8 },
  /// A one-off class on a single date.
  Extra { date: NaiveDate },
}

impl Schedule {
  /// Build a schedule from the flat column layout used by record stores.
  ///
  /// `day_of_week` is ignored for extra classes.
  pub fn from_parts(
    is_extra: bool,
    day_of_week: u8,
    extra_date: Option<NaiveDate>,
  ) -> Result<Self> {
    if is_extra {
      let date = extra_date.ok_or_else(|| {
        Error::Validation("an extra class requires a date".into())
      })?;
      Ok(Self::Extra { date })
    } else {
      if day_of_week > 6 {
        return Err(Error::Validation(format!(
          "day of week must be 0-6, got {day_of_week}"
        )));
      }
      Ok(Self::Weekly { day_of_week })
    }
  }

  pub fn is_extra(&self) -> bool { matches!(self, Self::Extra { .. }) }

  /// The weekday this schedule falls on. For extra classes this is derived
  /// from the date.
  pub fn day_of_week(&self) -> u8 {
    match self {
      Self::Weekly { day_of_week } => *day_of_week,
      Self::Extra { date } => day_of_week(*date),
    }
  }

  pub fn extra_date(&self) -> Option<NaiveDate> {
    match self {
      Self::Weekly { .. } => None,
      Self::Extra { date } => Some(*date),
    }
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A persisted subject definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:         Uuid,
  pub user_id:    Uuid,
  pub name:       String,
  pub short_name: Option<String>,
  pub color:      String,
  pub schedule:   Schedule,
  pub start_time: NaiveTime,
  pub end_time:   NaiveTime,
  pub room:       Option<String>,
}

impl Subject {
  pub fn is_extra(&self) -> bool { self.schedule.is_extra() }

  pub fn day_of_week(&self) -> u8 { self.schedule.day_of_week() }

  pub fn extra_date(&self) -> Option<NaiveDate> { self.schedule.extra_date() }

  /// Short name when set, otherwise the full name.
  pub fn label(&self) -> &str {
    self.short_name.as_deref().unwrap_or(&self.name)
  }
}

// ─── NewSubject ──────────────────────────────────────────────────────────────

/// Input to [`crate::catalog::SubjectCatalog::add`]. `id` and `user_id` are
/// assigned by the catalog.
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub name:       String,
  pub short_name: Option<String>,
  pub color:      String,
  pub schedule:   Schedule,
  pub start_time: NaiveTime,
  pub end_time:   NaiveTime,
  pub room:       Option<String>,
}

impl NewSubject {
  /// Convenience constructor with optional fields empty and the default
  /// colour.
  pub fn new(
    name: impl Into<String>,
    schedule: Schedule,
    start_time: NaiveTime,
    end_time: NaiveTime,
  ) -> Self {
    Self {
      name: name.into(),
      short_name: None,
      color: DEFAULT_COLOR.to_owned(),
      schedule,
      start_time,
      end_time,
      room: None,
    }
  }

  /// Attach an identifier and owner, producing the persisted form.
  pub fn into_subject(self, id: Uuid, user_id: Uuid) -> Subject {
    Subject {
      id,
      user_id,
      name: self.name,
      short_name: self.short_name,
      color: self.color,
      schedule: self.schedule,
      start_time: self.start_time,
      end_time: self.end_time,
      room: self.room,
    }
  }
}

// ─── SubjectPatch ────────────────────────────────────────────────────────────

/// A partial update. `None` leaves a field untouched; for the optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPatch {
  pub name:       Option<String>,
  pub short_name: Option<Option<String>>,
  pub color:      Option<String>,
  pub schedule:   Option<Schedule>,
  pub start_time: Option<NaiveTime>,
  pub end_time:   Option<NaiveTime>,
  pub room:       Option<Option<String>>,
}

impl SubjectPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Apply the patch to a copy of `subject`. Identity fields are never
  /// touched.
  pub fn apply(&self, subject: &Subject) -> Subject {
    let mut out = subject.clone();
    if let Some(name) = &self.name {
      out.name = name.clone();
    }
    if let Some(short_name) = &self.short_name {
      out.short_name = short_name.clone();
    }
    if let Some(color) = &self.color {
      out.color = color.clone();
    }
    if let Some(schedule) = self.schedule {
      out.schedule = schedule;
    }
    if let Some(start_time) = self.start_time {
      out.start_time = start_time;
    }
    if let Some(end_time) = self.end_time {
      out.end_time = end_time;
    }
    if let Some(room) = &self.room {
      out.room = room.clone();
    }
    out
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Trim an optional free-text field, mapping blank input to `None`.
fn blank_to_none(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

impl NewSubject {
  /// Trim free-text fields and check the field invariants: non-empty name,
  /// weekday in range, `start_time < end_time`.
  pub fn normalized(mut self) -> Result<Self> {
    self.name = self.name.trim().to_owned();
    if self.name.is_empty() {
      return Err(Error::Validation("subject name is required".into()));
    }
    self.short_name = blank_to_none(self.short_name);
    self.room = blank_to_none(self.room);
    if self.color.trim().is_empty() {
      self.color = DEFAULT_COLOR.to_owned();
    }
    if let Schedule::Weekly { day_of_week } = self.schedule
      && day_of_week > 6
    {
      return Err(Error::Validation(format!(
        "day of week must be 0-6, got {day_of_week}"
      )));
    }
    if self.start_time >= self.end_time {
      return Err(Error::Validation(format!(
        "start time {} must be before end time {}",
        self.start_time, self.end_time
      )));
    }
    Ok(self)
  }
}

impl From<Subject> for NewSubject {
  fn from(s: Subject) -> Self {
    Self {
      name:       s.name,
      short_name: s.short_name,
      color:      s.color,
      schedule:   s.schedule,
      start_time: s.start_time,
      end_time:   s.end_time,
      room:       s.room,
    }
  }
}

impl Subject {
  /// [`NewSubject::normalized`] applied to an existing subject.
  pub fn normalized(self) -> Result<Self> {
    let (id, user_id) = (self.id, self.user_id);
    Ok(NewSubject::from(self).normalized()?.into_subject(id, user_id))
  }
}
