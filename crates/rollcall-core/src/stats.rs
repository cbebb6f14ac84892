//! Attendance statistics and eligibility projections.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  attendance::{AttendanceRecord, AttendanceStatus},
  subject::Subject,
};

/// Float slack applied before rounding a projection, so that quotients which
/// are mathematically whole are not pushed over an integer boundary.
const EPSILON: f64 = 1e-9;

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Aggregate counts over a set of records.
///
/// `total` counts present and absent records; cancelled classes are tallied
/// separately and never affect the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub total:      u32,
  pub present:    u32,
  pub absent:     u32,
  pub cancelled:  u32,
  /// `round(present / total * 100)`, or 100 when nothing has been recorded.
  pub percentage: u32,
}

impl Stats {
  /// Build stats from raw counts, deriving `total` and `percentage`.
  pub fn from_counts(present: u32, absent: u32, cancelled: u32) -> Self {
    let total = present + absent;
    let percentage = if total == 0 {
      100
    } else {
      // Integer round-half-up of present * 100 / total.
      ((u64::from(present) * 200 + u64::from(total)) / (2 * u64::from(total)))
        as u32
    };
    Self { total, present, absent, cancelled, percentage }
  }

  pub fn ratio(&self) -> f64 { f64::from(self.percentage) / 100.0 }
}

impl Default for Stats {
  fn default() -> Self { Self::from_counts(0, 0, 0) }
}

fn tally<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Stats {
  let (mut present, mut absent, mut cancelled) = (0, 0, 0);
  for record in records {
    match record.status {
      AttendanceStatus::Present => present += 1,
      AttendanceStatus::Absent => absent += 1,
      AttendanceStatus::Cancelled => cancelled += 1,
    }
  }
  Stats::from_counts(present, absent, cancelled)
}

/// Stats over `records`, restricted to one subject when `subject_filter` is
/// set.
pub fn compute_stats(
  records: &[AttendanceRecord],
  subject_filter: Option<Uuid>,
) -> Stats {
  tally(
    records
      .iter()
      .filter(|r| subject_filter.is_none_or(|id| r.subject_id == id)),
  )
}

// ─── Threshold ───────────────────────────────────────────────────────────────

/// Minimum attendance ratio, strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
  pub const DEFAULT: Self = Self(0.75);

  pub fn new(value: f64) -> Result<Self> {
    if value > 0.0 && value < 1.0 {
      Ok(Self(value))
    } else {
      Err(Error::Validation(format!(
        "threshold must be between 0 and 1 (exclusive), got {value}"
      )))
    }
  }

  pub fn get(self) -> f64 { self.0 }

  /// Whether `stats` sits at or above the threshold. Uses the rounded
  /// percentage, so 74.6% counts as 75%.
  pub fn is_met_by(self, stats: &Stats) -> bool { stats.ratio() >= self.0 }
}

impl Default for Threshold {
  fn default() -> Self { Self::DEFAULT }
}

impl TryFrom<f64> for Threshold {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self> { Self::new(value) }
}

impl From<Threshold> for f64 {
  fn from(t: Threshold) -> Self { t.0 }
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// How many more classes may be missed while keeping
/// `present / (total + k) >= threshold`. Zero when already below.
pub fn compute_bunk_budget(stats: &Stats, threshold: Threshold) -> u32 {
  if !threshold.is_met_by(stats) {
    return 0;
  }
  let t = threshold.get();
  let k = (f64::from(stats.present) - t * f64::from(stats.total)) / t;
  (k + EPSILON).floor().max(0.0) as u32
}

/// How many consecutive classes must be attended to reach
/// `(present + k) / (total + k) >= threshold`. Zero when already met.
pub fn compute_catch_up_requirement(stats: &Stats, threshold: Threshold) -> u32 {
  if threshold.is_met_by(stats) {
    return 0;
  }
  let t = threshold.get();
  let k = (t * f64::from(stats.total) - f64::from(stats.present)) / (1.0 - t);
  (k - EPSILON).ceil().max(0.0) as u32
}

/// The actionable reading of a [`Stats`] against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "classes", rename_all = "snake_case")]
pub enum Eligibility {
  /// At or above the threshold; this many absences can be absorbed.
  CanBunk(u32),
  /// Below the threshold; this many consecutive presences are needed.
  MustAttend(u32),
}

impl Eligibility {
  pub fn assess(stats: &Stats, threshold: Threshold) -> Self {
    if threshold.is_met_by(stats) {
      Self::CanBunk(compute_bunk_budget(stats, threshold))
    } else {
      Self::MustAttend(compute_catch_up_requirement(stats, threshold))
    }
  }
}

// ─── Standing ────────────────────────────────────────────────────────────────

/// Percentage from which attendance is considered good.
pub const GOOD_PERCENTAGE: u32 = 85;

/// Coarse classification for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
  Low,
  Adequate,
  Good,
}

impl Standing {
  pub fn of(stats: &Stats, threshold: Threshold) -> Self {
    if !threshold.is_met_by(stats) {
      Self::Low
    } else if stats.percentage >= GOOD_PERCENTAGE && stats.total > 0 {
      Self::Good
    } else {
      Self::Adequate
    }
  }
}

// ─── Per-subject breakdown ───────────────────────────────────────────────────

/// Stats for one named subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectStats {
  /// The first catalog subject carrying this name.
  pub subject_id: Uuid,
  pub name:       String,
  pub color:      String,
  #[serde(flatten)]
  pub stats:      Stats,
}

/// One row per distinct regular-subject name, in catalog order.
///
/// A subject that meets on several weekdays is stored as several subjects
/// sharing a name; their records are pooled. Extra classes are left out.
/// Records whose subject no longer exists appear in no row.
pub fn subject_breakdown(
  subjects: &[Subject],
  records: &[AttendanceRecord],
) -> Vec<SubjectStats> {
  let mut rows: Vec<(SubjectStats, HashSet<Uuid>)> = Vec::new();

  for subject in subjects.iter().filter(|s| !s.is_extra()) {
    match rows.iter_mut().find(|(row, _)| row.name == subject.name) {
      Some((_, ids)) => {
        ids.insert(subject.id);
      }
      None => rows.push((
        SubjectStats {
          subject_id: subject.id,
          name:       subject.name.clone(),
          color:      subject.color.clone(),
          stats:      Stats::default(),
        },
        HashSet::from([subject.id]),
      )),
    }
  }

  rows
    .into_iter()
    .map(|(mut row, ids)| {
      row.stats = tally(records.iter().filter(|r| ids.contains(&r.subject_id)));
      row
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;
  use crate::subject::{NewSubject, Schedule};

  fn records(present: usize, absent: usize, cancelled: usize) -> Vec<AttendanceRecord> {
    let subject_id = Uuid::new_v4();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    [
      (AttendanceStatus::Present, present),
      (AttendanceStatus::Absent, absent),
      (AttendanceStatus::Cancelled, cancelled),
    ]
    .into_iter()
    .flat_map(|(status, n)| std::iter::repeat_n(status, n))
    .enumerate()
    .map(|(i, status)| AttendanceRecord {
      id: Uuid::new_v4(),
      user_id: Uuid::nil(),
      subject_id,
      date: start + chrono::Duration::days(i as i64),
      status,
    })
    .collect()
  }

  fn stats(present: u32, total: u32) -> Stats {
    Stats::from_counts(present, total - present, 0)
  }

  #[test]
  fn counts_and_percentage() {
    let s = compute_stats(&records(6, 2, 1), None);
    assert_eq!(
      s,
      Stats { total: 8, present: 6, absent: 2, cancelled: 1, percentage: 75 }
    );
  }

  #[test]
  fn empty_history_is_full_attendance() {
    assert_eq!(
      compute_stats(&[], None),
      Stats { total: 0, present: 0, absent: 0, cancelled: 0, percentage: 100 }
    );
  }

  #[test]
  fn only_cancelled_is_full_attendance() {
    let s = compute_stats(&records(0, 0, 3), None);
    assert_eq!(s.total, 0);
    assert_eq!(s.cancelled, 3);
    assert_eq!(s.percentage, 100);
  }

  #[test]
  fn percentage_rounds_half_up() {
    // 1/8 = 12.5%
    assert_eq!(stats(1, 8).percentage, 13);
    // 2/3 = 66.67%
    assert_eq!(stats(2, 3).percentage, 67);
    // 1/3 = 33.33%
    assert_eq!(stats(1, 3).percentage, 33);
  }

  #[test]
  fn subject_filter_restricts_records() {
    let mut all = records(3, 1, 0);
    let other = records(0, 4, 0);
    let target = all[0].subject_id;
    all.extend(other);

    let filtered = compute_stats(&all, Some(target));
    assert_eq!((filtered.present, filtered.absent), (3, 1));
    let overall = compute_stats(&all, None);
    assert_eq!((overall.present, overall.absent), (3, 5));
  }

  #[test]
  fn bunk_budget_above_threshold() {
    let s = stats(30, 36);
    assert_eq!(s.percentage, 83);
    assert_eq!(compute_bunk_budget(&s, Threshold::DEFAULT), 4);
    assert_eq!(compute_catch_up_requirement(&s, Threshold::DEFAULT), 0);
  }

  #[test]
  fn catch_up_below_threshold() {
    let s = stats(20, 30);
    assert_eq!(s.percentage, 67);
    assert_eq!(compute_catch_up_requirement(&s, Threshold::DEFAULT), 10);
    assert_eq!(compute_bunk_budget(&s, Threshold::DEFAULT), 0);
  }

  #[test]
  fn exactly_at_threshold_can_bunk() {
    let s = stats(3, 4);
    assert_eq!(s.percentage, 75);
    assert_eq!(Eligibility::assess(&s, Threshold::DEFAULT), Eligibility::CanBunk(0));
    let s = stats(6, 8);
    assert_eq!(Eligibility::assess(&s, Threshold::DEFAULT), Eligibility::CanBunk(0));
  }

  #[test]
  fn rounded_up_to_threshold_clamps_budget_to_zero() {
    // 59/79 = 74.68% rounds to 75.
    let s = stats(59, 79);
    assert_eq!(s.percentage, 75);
    assert_eq!(compute_bunk_budget(&s, Threshold::DEFAULT), 0);
  }

  #[test]
  fn projections_hold_for_other_thresholds() {
    let t = Threshold::new(0.6).unwrap();
    // 9/10: (9 - 6) / 0.6 = 5 more absences -> 9/15 = 60%.
    assert_eq!(compute_bunk_budget(&stats(9, 10), t), 5);
    // 4/10: (6 - 4) / 0.4 = 5 more presences -> 9/15 = 60%.
    assert_eq!(compute_catch_up_requirement(&stats(4, 10), t), 5);

    let t = Threshold::new(0.9).unwrap();
    // 8/10: (9 - 8) / 0.1 = 10 -> 18/20 = 90%.
    assert_eq!(compute_catch_up_requirement(&stats(8, 10), t), 10);
  }

  #[test]
  fn projections_reach_but_do_not_overshoot_threshold() {
    let t = Threshold::DEFAULT;
    for total in 1..60u32 {
      for present in 0..=total {
        let s = stats(present, total);
        match Eligibility::assess(&s, t) {
          Eligibility::CanBunk(k) => {
            let after = f64::from(present) / f64::from(total + k);
            let past = f64::from(present) / f64::from(total + k + 1);
            // The budget never drops the exact ratio below the threshold,
            // except where rounding already placed the user on it.
            if f64::from(present) / f64::from(total) >= 0.75 {
              assert!(after >= 0.75 - EPSILON, "{present}/{total} k={k}");
            }
            assert!(past < 0.75, "{present}/{total} k={k}");
          }
          Eligibility::MustAttend(k) => {
            let after = f64::from(present + k) / f64::from(total + k);
            assert!(after >= 0.75 - EPSILON, "{present}/{total} k={k}");
            if k > 0 {
              let short = f64::from(present + k - 1) / f64::from(total + k - 1);
              assert!(short < 0.75, "{present}/{total} k={k}");
            }
          }
        }
      }
    }
  }

  #[test]
  fn threshold_bounds() {
    assert!(Threshold::new(0.0).is_err());
    assert!(Threshold::new(1.0).is_err());
    assert!(Threshold::new(f64::NAN).is_err());
    assert_eq!(Threshold::default().get(), 0.75);
  }

  #[test]
  fn standing_bands() {
    let t = Threshold::DEFAULT;
    assert_eq!(Standing::of(&stats(7, 10), t), Standing::Low);
    assert_eq!(Standing::of(&stats(8, 10), t), Standing::Adequate);
    assert_eq!(Standing::of(&stats(17, 20), t), Standing::Good);
    // No history: 100% but nothing to be proud of yet.
    assert_eq!(Standing::of(&Stats::default(), t), Standing::Adequate);
  }

  #[test]
  fn breakdown_pools_same_named_regular_subjects() {
    let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    let user = Uuid::nil();
    let mon = NewSubject::new("Math", Schedule::Weekly { day_of_week: 1 }, t(9), t(10))
      .into_subject(Uuid::new_v4(), user);
    let wed = NewSubject::new("Math", Schedule::Weekly { day_of_week: 3 }, t(9), t(10))
      .into_subject(Uuid::new_v4(), user);
    let phys = NewSubject::new("Physics", Schedule::Weekly { day_of_week: 2 }, t(11), t(12))
      .into_subject(Uuid::new_v4(), user);
    let extra = NewSubject::new(
      "Math",
      Schedule::Extra { date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap() },
      t(9),
      t(10),
    )
    .into_subject(Uuid::new_v4(), user);

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rec = |subject_id, status| AttendanceRecord {
      id: Uuid::new_v4(),
      user_id: user,
      subject_id,
      date,
      status,
    };
    let records = vec![
      rec(mon.id, AttendanceStatus::Present),
      rec(wed.id, AttendanceStatus::Absent),
      rec(extra.id, AttendanceStatus::Present),
      rec(phys.id, AttendanceStatus::Cancelled),
      rec(Uuid::new_v4(), AttendanceStatus::Present),
    ];

    let rows = subject_breakdown(&[mon.clone(), phys, wed, extra], &records);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Math");
    assert_eq!(rows[0].subject_id, mon.id);
    assert_eq!((rows[0].stats.present, rows[0].stats.absent), (1, 1));
    assert_eq!(rows[1].name, "Physics");
    assert_eq!(rows[1].stats.cancelled, 1);
    assert_eq!(rows[1].stats.percentage, 100);
  }
}
