//! Schedule resolution: which classes meet on a given date.
//!
//! Everything here is a pure function of its inputs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subject::{Schedule, Subject, day_of_week};

/// One concrete meeting of a subject on a date. Derived on demand, never
/// stored. Identity is `(subject.id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
  pub subject: Subject,
  pub date:    NaiveDate,
}

impl Occurrence {
  pub fn subject_id(&self) -> Uuid { self.subject.id }

  pub fn key(&self) -> (Uuid, NaiveDate) { (self.subject.id, self.date) }
}

/// Whether `subject` meets on `date`.
///
/// Extra classes match their exact date only; weekly subjects match every
/// date falling on their weekday.
pub fn meets_on(subject: &Subject, date: NaiveDate) -> bool {
  match subject.schedule {
    Schedule::Extra { date: extra } => extra == date,
    Schedule::Weekly { day_of_week: dow } => day_of_week(date) == dow,
  }
}

/// The occurrences on `date`, ordered by start time.
///
/// The sort is stable: subjects starting at the same time keep their
/// catalog order.
pub fn occurrences_on(subjects: &[Subject], date: NaiveDate) -> Vec<Occurrence> {
  let mut out: Vec<Occurrence> = subjects
    .iter()
    .filter(|s| meets_on(s, date))
    .map(|s| Occurrence { subject: s.clone(), date })
    .collect();
  out.sort_by_key(|o| o.subject.start_time);
  out
}

/// The weekly timetable for one weekday: regular subjects only, ordered by
/// start time. Extra classes are not part of the timetable.
pub fn weekly_timetable(subjects: &[Subject], dow: u8) -> Vec<&Subject> {
  let mut out: Vec<&Subject> = subjects
    .iter()
    .filter(|s| s.schedule == Schedule::Weekly { day_of_week: dow })
    .collect();
  out.sort_by_key(|s| s.start_time);
  out
}

/// `start_time <= now <= end_time`; both bounds inclusive.
pub fn is_ongoing(subject: &Subject, now: NaiveTime) -> bool {
  subject.start_time <= now && now <= subject.end_time
}

/// The class has finished: `now > end_time`.
pub fn is_past(subject: &Subject, now: NaiveTime) -> bool {
  now > subject.end_time
}
