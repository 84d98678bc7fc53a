//! Error types for the cyto-tabular codec.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input file not found: {}", .0.display())]
  FileNotFound(PathBuf),

  /// The header row lacks required columns; all of them are listed.
  #[error("missing required columns: {}", .missing.join(", "))]
  SchemaValidation { missing: Vec<String> },

  #[error("parse error on line {line}: {message}")]
  Parse { line: u64, message: String },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
