//! Error type for `cyto-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input file could not be read, validated or parsed.
  #[error(transparent)]
  Input(#[from] cyto_tabular::Error),

  /// A foreign-key, CHECK or uniqueness constraint rejected a write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A read-only open found a database without the cytometry tables.
  #[error("database has no cytometry schema (missing table {0:?})")]
  MissingSchema(String),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("core error: {0}")]
  Core(#[from] cyto_core::Error),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match &e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, message))
        if failure.code == ErrorCode::ConstraintViolation =>
      {
        Self::ConstraintViolation(message.clone().unwrap_or_else(|| failure.to_string()))
      }
      _ => Self::Database(e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
