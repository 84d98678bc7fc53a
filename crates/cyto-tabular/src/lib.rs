//! CSV codec for the cytometry pipeline.
//!
//! Reads the wide cell-count input file into [`InputRecord`]s and writes the
//! analysis tables back out as CSV. Pure synchronous; no database or HTTP
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let records = cyto_tabular::read_input("data/cell-count.csv").unwrap();
//! println!("{} samples", records.len());
//! ```

pub mod error;
mod parse;
mod serialize;

use cyto_core::{
  population::Population,
  subject::{Response, Sex},
};

pub use error::{Error, Result};
pub use parse::{REQUIRED_COLUMNS, parse_reader, read_input};
pub use serialize::{
  overview_to_string, write_comparison_records, write_overview, write_statistics,
};

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// One data row of the input file: a sample with its subject metadata and
/// the five population counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
  pub project:                   String,
  pub subject:                   String,
  pub condition:                 String,
  pub age:                       i64,
  pub sex:                       Sex,
  pub treatment:                 String,
  pub response:                  Option<Response>,
  pub sample:                    String,
  pub sample_type:               String,
  pub time_from_treatment_start: i64,
  /// Counts in [`Population::all`] order.
  pub counts:                    [u64; 5],
}

impl InputRecord {
  /// Fan the wide count columns out into one `(population, count)` pair per
  /// population.
  pub fn cell_counts(&self) -> impl Iterator<Item = (Population, u64)> + '_ {
    Population::all().zip(self.counts.iter().copied())
  }

  pub fn total_count(&self) -> u64 {
    self.counts.iter().fold(0, |acc, &c| acc.saturating_add(c))
  }
}
