//! Error type for `rollcall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollcall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored date, time or status string could not be decoded.
  #[error("parse error: {0}")]
  Parse(String),

  #[error("subject not found: {0}")]
  SubjectNotFound(uuid::Uuid),

  #[error("attendance record not found: {0}")]
  RecordNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
