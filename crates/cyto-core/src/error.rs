//! Error types for `cyto-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown population: {0:?}")]
  UnknownPopulation(String),

  #[error("unknown sex: {0:?} (expected M or F)")]
  UnknownSex(String),

  #[error("unknown response: {0:?} (expected yes, no or empty)")]
  UnknownResponse(String),

  #[error("statistics error: {0}")]
  Statistics(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
