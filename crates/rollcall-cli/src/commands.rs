//! Command dispatch: each handler drives the core components and prints.

use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use chrono::{Local, NaiveDate, Utc};
use rollcall_core::{
  attendance::AttendanceStatus,
  catalog::SubjectCatalog,
  export::{export_summary, report_filename},
  ledger::{AttendanceLedger, annotate},
  profile::{ProfileBook, ProfileUpdate},
  schedule::{occurrences_on, weekly_timetable},
  session::Session,
  stats::{Eligibility, Standing, Threshold, compute_stats, subject_breakdown},
  subject::{NewSubject, Schedule, SubjectPatch, WEEKDAYS},
};
use rollcall_store_sqlite::SqliteStore;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{Command, Details, ProfileCommand, SubjectCommand, render, settings::CliConfig};

type Store = Arc<SqliteStore>;

/// Everything a command needs: the write surfaces over one shared store,
/// plus the resolved configuration.
pub struct App {
  catalog:   SubjectCatalog<Store>,
  ledger:    AttendanceLedger<Store>,
  profiles:  ProfileBook<Store>,
  session:   Option<Session>,
  threshold: Threshold,
  json:      bool,
}

impl App {
  pub fn new(store: Store, cfg: &CliConfig, json: bool) -> Self {
    Self {
      catalog: SubjectCatalog::new(store.clone()),
      ledger: AttendanceLedger::new(store.clone()),
      profiles: ProfileBook::new(store),
      session: cfg.session(),
      threshold: cfg.threshold,
      json,
    }
  }

  fn session(&self) -> Option<&Session> { self.session.as_ref() }

  /// Print `value` as JSON, or the text rendering otherwise.
  fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if self.json {
      let out = serde_json::to_string_pretty(value).context("serialising output")?;
      println!("{out}");
    } else {
      let out = text();
      if !out.is_empty() {
        println!("{out}");
      }
    }
    Ok(())
  }
}

fn today() -> NaiveDate { Local::now().date_naive() }

fn apply_details(input: &mut NewSubject, details: Details) {
  input.short_name = details.short;
  input.room = details.room;
  if let Some(color) = details.color {
    input.color = color;
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run(app: &App, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Subject(cmd) => subject(app, cmd).await,
    Command::Profile(cmd) => profile(app, cmd).await,
    Command::Today => agenda(app, today()).await,
    Command::Day { date } => agenda(app, date).await,
    Command::Timetable { weekday } => timetable(app, weekday).await,
    Command::Mark { subject_id, status, date } => {
      mark(app, subject_id, status, date.unwrap_or_else(today)).await
    }
    Command::Unmark { subject_id, date } => {
      unmark(app, subject_id, date.unwrap_or_else(today)).await
    }
    Command::Stats { threshold } => stats(app, threshold.unwrap_or(app.threshold)).await,
    Command::Export { out } => export(app, &out).await,
  }
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

async fn subject(app: &App, cmd: SubjectCommand) -> anyhow::Result<()> {
  match cmd {
    SubjectCommand::Add { name, day, times, details } => {
      let mut input = NewSubject::new(
        name,
        Schedule::Weekly { day_of_week: day },
        times.start,
        times.end,
      );
      apply_details(&mut input, details);
      let (created, _) = app.catalog.add(app.session(), input).await?;
      app.emit(&created, || format!("added {}", render::subject(&created)))
    }

    SubjectCommand::Extra { name, date, times, details } => {
      let mut input = NewSubject::new(name, Schedule::Extra { date }, times.start, times.end);
      apply_details(&mut input, details);
      let (created, _) = app.catalog.add(app.session(), input).await?;
      app.emit(&created, || format!("added {}", render::subject(&created)))
    }

    SubjectCommand::List => {
      let subjects = app.catalog.subjects(app.session()).await?;
      app.emit(&subjects, || {
        subjects.iter().map(render::subject).collect::<Vec<_>>().join("\n")
      })
    }

    SubjectCommand::Rm { id } => {
      let subjects = app.catalog.delete(app.session(), id).await?;
      app.emit(&json!({ "deleted": id, "remaining": subjects.len() }), || {
        format!("deleted {id}")
      })
    }

    SubjectCommand::Edit { id, name, day, date, start, end, details } => {
      let schedule = match (day, date) {
        (Some(day_of_week), _) => Some(Schedule::Weekly { day_of_week }),
        (None, Some(date)) => Some(Schedule::Extra { date }),
        (None, None) => None,
      };
      let patch = SubjectPatch {
        name,
        short_name: details.short.map(Some),
        color: details.color,
        schedule,
        start_time: start,
        end_time: end,
        room: details.room.map(Some),
      };
      anyhow::ensure!(!patch.is_empty(), "nothing to change");

      let subjects = app.catalog.update(app.session(), id, patch).await?;
      let updated = subjects.into_iter().find(|s| s.id == id);
      app.emit(&updated, || {
        updated
          .as_ref()
          .map(|s| format!("updated {}", render::subject(s)))
          .unwrap_or_default()
      })
    }
  }
}

// ─── Profile ──────────────────────────────────────────────────────────────────

async fn profile(app: &App, cmd: ProfileCommand) -> anyhow::Result<()> {
  let profile = match cmd {
    ProfileCommand::Show => app.profiles.profile(app.session()).await?,
    ProfileCommand::Set { name, roll, semester, department } => {
      let update = ProfileUpdate {
        full_name: name,
        roll_number: roll,
        semester,
        department,
      };
      anyhow::ensure!(!update.is_empty(), "nothing to change");
      app.profiles.save(app.session(), update).await?
    }
  };
  app.emit(&profile, || render::profile(profile.as_ref()))
}

// ─── Agenda ───────────────────────────────────────────────────────────────────

async fn agenda(app: &App, date: NaiveDate) -> anyhow::Result<()> {
  let subjects = app.catalog.subjects(app.session()).await?;
  let records = app.ledger.records(app.session()).await?;
  let items = annotate(occurrences_on(&subjects, date), &records)?;

  let now = Local::now();
  let clock = (date == now.date_naive()).then(|| now.time());

  app.emit(&items, || {
    let weekday = WEEKDAYS[usize::from(rollcall_core::subject::day_of_week(date))];
    let mut lines = vec![format!("{weekday} {date}")];
    if items.is_empty() {
      lines.push("no classes".to_owned());
    }
    lines.extend(items.iter().map(|item| render::occurrence(item, clock)));
    lines.join("\n")
  })
}

async fn timetable(app: &App, weekday: u8) -> anyhow::Result<()> {
  let subjects = app.catalog.subjects(app.session()).await?;
  let day = weekly_timetable(&subjects, weekday);
  app.emit(&day, || {
    day.iter().map(|s| render::subject(s)).collect::<Vec<_>>().join("\n")
  })
}

// ─── Attendance ───────────────────────────────────────────────────────────────

async fn mark(
  app: &App,
  subject_id: Uuid,
  status: AttendanceStatus,
  date: NaiveDate,
) -> anyhow::Result<()> {
  let marked = app.ledger.mark(app.session(), subject_id, date, status).await?;
  let kind = marked.kind;
  app.emit(
    &json!({ "subject_id": subject_id, "date": date, "status": status, "kind": kind }),
    || format!("{subject_id} on {date}: {status}"),
  )
}

async fn unmark(app: &App, subject_id: Uuid, date: NaiveDate) -> anyhow::Result<()> {
  app.ledger.clear(app.session(), subject_id, date).await?;
  app.emit(&json!({ "subject_id": subject_id, "date": date, "status": null }), || {
    format!("{subject_id} on {date}: cleared")
  })
}

// ─── Stats ────────────────────────────────────────────────────────────────────

async fn stats(app: &App, threshold: Threshold) -> anyhow::Result<()> {
  let subjects = app.catalog.subjects(app.session()).await?;
  let records = app.ledger.records(app.session()).await?;

  let overall = compute_stats(&records, None);
  let per_subject = subject_breakdown(&subjects, &records);

  app.emit(
    &json!({
      "threshold":   threshold,
      "overall":     overall,
      "standing":    Standing::of(&overall, threshold),
      "eligibility": Eligibility::assess(&overall, threshold),
      "subjects":    per_subject,
    }),
    || render::report(&overall, &per_subject, threshold),
  )
}

async fn export(app: &App, out: &Path) -> anyhow::Result<()> {
  let subjects = app.catalog.subjects(app.session()).await?;
  let records = app.ledger.records(app.session()).await?;

  let csv = export_summary(
    &subject_breakdown(&subjects, &records),
    &compute_stats(&records, None),
  )?;

  let path = out.join(report_filename(Utc::now().date_naive()));
  std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
  tracing::info!(path = %path.display(), "report written");

  app.emit(&json!({ "path": path }), || path.display().to_string())
}
