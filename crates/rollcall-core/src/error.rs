//! Error types for `rollcall-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A write was attempted without an authenticated session.
  #[error("authentication required")]
  AuthenticationRequired,

  /// Caller-supplied input was missing or malformed. Raised before any store
  /// call is made.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The record store reported an error. Never retried.
  #[error("store error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// More than one attendance record exists for a key that must be unique.
  #[error(
    "found {count} attendance records for subject {subject_id} on {date}; \
     expected at most one"
  )]
  ConsistencyFault {
    subject_id: Uuid,
    date:       NaiveDate,
    count:      usize,
  },

  #[error("export error: {0}")]
  Export(String),
}

impl Error {
  /// Wrap a store error. Used with `map_err` at every store call site.
  pub fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
