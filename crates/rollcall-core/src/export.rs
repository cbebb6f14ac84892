//! CSV attendance report.
//!
//! Fields are written unquoted, so a subject name containing a comma will
//! shift the columns of its row.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  stats::{Stats, SubjectStats},
};

pub const HEADER: [&str; 6] =
  ["Subject", "Total", "Present", "Absent", "Cancelled", "Percentage"];

fn row(label: &str, stats: &Stats) -> [String; 6] {
  [
    label.to_owned(),
    stats.total.to_string(),
    stats.present.to_string(),
    stats.absent.to_string(),
    stats.cancelled.to_string(),
    format!("{}%", stats.percentage),
  ]
}

fn export_err(e: impl std::fmt::Display) -> Error { Error::Export(e.to_string()) }

fn builder() -> csv::WriterBuilder {
  let mut builder = csv::WriterBuilder::new();
  builder
    .has_headers(false)
    .quote_style(csv::QuoteStyle::Never)
    .terminator(csv::Terminator::Any(b'\n'));
  builder
}

/// Render the report: header, one row per subject in input order, a blank
/// line, then the `Overall` row. Lines are `\n`-separated with no trailing
/// newline.
pub fn export_summary(per_subject: &[SubjectStats], overall: &Stats) -> Result<String> {
  let mut buf = Vec::new();

  let mut writer = builder().from_writer(&mut buf);
  writer.write_record(HEADER).map_err(export_err)?;
  for subject in per_subject {
    writer
      .write_record(row(&subject.name, &subject.stats))
      .map_err(export_err)?;
  }
  writer.flush().map_err(export_err)?;
  drop(writer);

  // Blank separator; the csv writer would emit `""` for an empty record.
  buf.push(b'\n');

  let mut writer = builder().from_writer(&mut buf);
  writer.write_record(row("Overall", overall)).map_err(export_err)?;
  writer.flush().map_err(export_err)?;
  drop(writer);

  let mut text = String::from_utf8(buf).map_err(export_err)?;
  if text.ends_with('\n') {
    text.pop();
  }
  Ok(text)
}

/// `attendance_report_<YYYY-MM-DD>.csv`
pub fn report_filename(date: NaiveDate) -> String {
  format!("attendance_report_{}.csv", date.format("%Y-%m-%d"))
}
