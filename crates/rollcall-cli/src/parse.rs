//! Argument value parsers for clap.

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::{stats::Threshold, subject::WEEKDAYS};

/// Accepts `0`-`6` (0 = Sunday) or a weekday name, full or abbreviated to at
/// least three letters, in any case.
pub fn weekday(s: &str) -> Result<u8, String> {
  let s = s.trim();
  if let Ok(n) = s.parse::<u8>() {
    return if n <= 6 {
      Ok(n)
    } else {
      Err(format!("day of week must be 0-6, got {n}"))
    };
  }

  let lower = s.to_ascii_lowercase();
  if lower.len() >= 3
    && let Some(i) = WEEKDAYS
      .iter()
      .position(|day| day.to_ascii_lowercase().starts_with(&lower))
  {
    return Ok(i as u8);
  }
  Err(format!("unknown weekday {s:?}"))
}

/// `HH:MM` or `HH:MM:SS`.
pub fn time(s: &str) -> Result<NaiveTime, String> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|_| format!("expected HH:MM or HH:MM:SS, got {s:?}"))
}

/// `YYYY-MM-DD`.
pub fn date(s: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| format!("expected YYYY-MM-DD, got {s:?}"))
}

pub fn threshold(s: &str) -> Result<Threshold, String> {
  let value: f64 = s.parse().map_err(|_| format!("not a number: {s:?}"))?;
  Threshold::new(value).map_err(|e| e.to_string())
}
