//! `rollcall`: command-line attendance tracker.
//!
//! Reads `rollcall.toml` (or the path given with `--config`) and `ROLLCALL_*`
//! environment variables, opens the SQLite store, and runs one command.
//!
//! # Usage
//!
//! ```
//! rollcall subject add Physics --day mon --start 09:00 --end 10:00
//! rollcall profile set --name "Ada Lovelace" --semester 3
//! rollcall today
//! rollcall mark <subject-id> present
//! rollcall stats --threshold 0.8
//! ```

mod commands;
mod settings;
mod parse;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use rollcall_core::{attendance::AttendanceStatus, stats::Threshold};
use rollcall_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use commands::App;
use settings::CliConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Track class attendance")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "rollcall.toml")]
  config: PathBuf,

  /// Print results as JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage subjects.
  #[command(subcommand)]
  Subject(SubjectCommand),

  /// Show or edit the student profile.
  #[command(subcommand)]
  Profile(ProfileCommand),

  /// Today's classes with their attendance status.
  Today,

  /// Classes on a given date.
  Day {
    #[arg(value_parser = parse::date)]
    date: NaiveDate,
  },

  /// The weekly timetable for one weekday.
  Timetable {
    #[arg(value_parser = parse::weekday)]
    weekday: u8,
  },

  /// Record attendance for a class.
  Mark {
    subject_id: Uuid,
    status:     AttendanceStatus,
    /// Date of the class (default: today).
    #[arg(long, value_parser = parse::date)]
    date:       Option<NaiveDate>,
  },

  /// Remove the attendance record for a class.
  Unmark {
    subject_id: Uuid,
    #[arg(long, value_parser = parse::date)]
    date:       Option<NaiveDate>,
  },

  /// Attendance statistics and projections.
  Stats {
    /// Override the configured threshold, e.g. 0.8.
    #[arg(long, value_parser = parse::threshold)]
    threshold: Option<Threshold>,
  },

  /// Write the CSV summary report.
  Export {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
  },
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
  /// Add a weekly subject.
  Add {
    name:    String,
    #[arg(long, value_parser = parse::weekday)]
    day:     u8,
    #[command(flatten)]
    times:   Times,
    #[command(flatten)]
    details: Details,
  },

  /// Add a one-off extra class.
  Extra {
    name:    String,
    #[arg(long, value_parser = parse::date)]
    date:    NaiveDate,
    #[command(flatten)]
    times:   Times,
    #[command(flatten)]
    details: Details,
  },

  /// List all subjects.
  List,

  /// Delete a subject and its attendance records.
  Rm { id: Uuid },

  /// Change fields of a subject. Pass an empty string to clear an optional
  /// field.
  Edit {
    id:      Uuid,
    #[arg(long)]
    name:    Option<String>,
    #[arg(long, value_parser = parse::weekday, conflicts_with = "date")]
    day:     Option<u8>,
    #[arg(long, value_parser = parse::date)]
    date:    Option<NaiveDate>,
    #[arg(long, value_parser = parse::time)]
    start:   Option<NaiveTime>,
    #[arg(long, value_parser = parse::time)]
    end:     Option<NaiveTime>,
    #[command(flatten)]
    details: Details,
  },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
  /// Print the profile.
  Show,

  /// Change profile fields. Pass an empty string to clear one.
  Set {
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    roll:       Option<String>,
    #[arg(long)]
    semester:   Option<String>,
    #[arg(long)]
    department: Option<String>,
  },
}

#[derive(Args, Debug)]
struct Times {
  #[arg(long, value_parser = parse::time)]
  start: NaiveTime,
  #[arg(long, value_parser = parse::time)]
  end:   NaiveTime,
}

#[derive(Args, Debug)]
struct Details {
  #[arg(long)]
  short: Option<String>,
  #[arg(long)]
  room:  Option<String>,
  #[arg(long)]
  color: Option<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  if let Some(parent) = cfg.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::debug!(path = ?cfg.store_path, "store opened");

  let app = App::new(Arc::new(store), &cfg, cli.json);
  commands::run(&app, cli.command).await
}
