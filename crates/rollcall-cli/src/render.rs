//! Plain-text rendering for terminal output.

use chrono::NaiveTime;
use rollcall_core::{
  ledger::AnnotatedOccurrence,
  profile::{ANONYMOUS, Profile},
  schedule::{is_ongoing, is_past},
  stats::{Eligibility, Standing, Stats, SubjectStats, Threshold},
  subject::{Schedule, Subject, WEEKDAYS},
};

const TIME_FORMAT: &str = "%H:%M";

fn span(subject: &Subject) -> String {
  format!(
    "{}-{}",
    subject.start_time.format(TIME_FORMAT),
    subject.end_time.format(TIME_FORMAT)
  )
}

fn weekday_name(dow: u8) -> &'static str {
  WEEKDAYS.get(usize::from(dow)).copied().unwrap_or("?")
}

pub fn schedule(schedule: &Schedule) -> String {
  match schedule {
    Schedule::Weekly { day_of_week } => weekday_name(*day_of_week).to_owned(),
    Schedule::Extra { date } => format!("extra {date}"),
  }
}

/// One catalog line: id, when, name and optional room.
pub fn subject(subject: &Subject) -> String {
  let mut line = format!(
    "{}  {:<16} {}  {}",
    subject.id,
    schedule(&subject.schedule),
    span(subject),
    subject.name
  );
  if let Some(short) = &subject.short_name {
    line.push_str(&format!(" ({short})"));
  }
  if let Some(room) = &subject.room {
    line.push_str(&format!(" @ {room}"));
  }
  line
}

/// Progress marker for an occurrence happening today.
pub fn progress(subject: &Subject, now: NaiveTime) -> &'static str {
  if is_ongoing(subject, now) {
    "live"
  } else if is_past(subject, now) {
    "over"
  } else {
    ""
  }
}

/// One agenda line. `now` is set only when the agenda is for today.
pub fn occurrence(item: &AnnotatedOccurrence, now: Option<NaiveTime>) -> String {
  let subject = &item.occurrence.subject;
  let status = item
    .status
    .map_or_else(|| "-".to_owned(), |s| s.to_string());
  let marker = now.map_or("", |now| progress(subject, now));
  format!(
    "{}  {}  {:<10} {:<4}  {}",
    span(subject),
    subject.id,
    status,
    marker,
    subject.label()
  )
  .trim_end()
  .to_owned()
}

pub fn stats(label: &str, stats: &Stats) -> String {
  format!(
    "{label:<20} {:>4}%  present {} / {}  (absent {}, cancelled {})",
    stats.percentage, stats.present, stats.total, stats.absent, stats.cancelled
  )
}

pub fn standing(standing: Standing) -> &'static str {
  match standing {
    Standing::Low => "low",
    Standing::Adequate => "adequate",
    Standing::Good => "good",
  }
}

pub fn eligibility(eligibility: Eligibility, threshold: Threshold) -> String {
  let target = (threshold.get() * 100.0).round();
  match eligibility {
    Eligibility::CanBunk(0) => format!("No classes to spare at {target}%."),
    Eligibility::CanBunk(n) => format!("You can miss {n} more class(es) and stay at {target}%."),
    Eligibility::MustAttend(0) => {
      format!("Just under {target}% after rounding; attend your next class.")
    }
    Eligibility::MustAttend(n) => format!("Attend the next {n} class(es) to reach {target}%."),
  }
}

/// Profile card: name with initials, then whichever details are set.
pub fn profile(profile: Option<&Profile>) -> String {
  let Some(profile) = profile else {
    return ANONYMOUS.to_owned();
  };
  let mut lines = vec![format!("{} ({})", profile.display_name(), profile.initials())];
  let details = [
    ("Roll", &profile.roll_number),
    ("Semester", &profile.semester),
    ("Department", &profile.department),
  ];
  for (label, value) in details {
    if let Some(value) = value {
      lines.push(format!("{label}: {value}"));
    }
  }
  lines.join("\n")
}

/// Full stats report: overall line, projection, then one line per subject.
pub fn report(overall: &Stats, per_subject: &[SubjectStats], threshold: Threshold) -> String {
  let mut lines = vec![
    format!(
      "{}  [{}]",
      stats("Overall", overall),
      standing(Standing::of(overall, threshold))
    ),
    eligibility(Eligibility::assess(overall, threshold), threshold),
  ];
  if !per_subject.is_empty() {
    lines.push(String::new());
    lines.extend(per_subject.iter().map(|row| stats(&row.name, &row.stats)));
  }
  lines.join("\n")
}
