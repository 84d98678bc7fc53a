//! The `CytometryStore` trait and the raw row types it returns.
//!
//! The trait is implemented by storage backends (e.g. `cyto-store-sqlite`).
//! The analyses in [`crate::analysis`], the CLI and the dashboard depend on
//! this abstraction, not on any concrete backend.

use std::{future::Future, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
  cohort::CohortFilter,
  population::Population,
  subject::{Response, Sex},
};

// ─── Row types ───────────────────────────────────────────────────────────────

/// Totals reported after a successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
  /// Data rows read from the input file.
  pub rows:        usize,
  pub projects:    usize,
  pub subjects:    usize,
  pub samples:     usize,
  pub cell_counts: usize,
}

/// Distinct-value counts over the loaded projects, subjects and samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
  pub projects:   usize,
  pub subjects:   usize,
  pub samples:    usize,
  pub conditions: usize,
  pub treatments: usize,
}

/// One `cell_counts` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
  pub sample_id:  String,
  pub population: Population,
  pub count:      u64,
}

/// A cell count joined with its sample and subject, for cohort comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortCountRow {
  pub subject_id:                String,
  pub response:                  Response,
  pub sample_id:                 String,
  pub population:                Population,
  pub count:                     u64,
  pub time_from_treatment_start: i64,
}

/// A baseline sample joined with its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineSampleRow {
  pub project_id: String,
  pub subject_id: String,
  pub response:   Option<Response>,
  pub sex:        Sex,
  pub sample_id:  String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a cytometry store backend.
///
/// A store holds exactly one input file's worth of data: [`load`] replaces
/// everything except the fixed population reference rows. All other methods
/// are pure reads and return empty vectors rather than errors when nothing
/// matches.
///
/// [`load`]: CytometryStore::load
pub trait CytometryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Parse, validate and load the CSV file at `path`, replacing all prior
  /// projects, subjects, samples and cell counts.
  fn load<'a>(
    &'a self,
    path: &'a Path,
  ) -> impl Future<Output = Result<LoadReport, Self::Error>> + Send + 'a;

  /// Distinct projects, subjects, samples, conditions and treatments.
  fn sample_summary(
    &self,
  ) -> impl Future<Output = Result<StoreSummary, Self::Error>> + Send + '_;

  /// Every cell count, ordered by sample then population id.
  fn cell_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<CountRow>, Self::Error>> + Send + '_;

  /// Cell counts of samples in `filter` whose subject has a recorded
  /// response, ordered by sample then population id.
  fn cohort_counts<'a>(
    &'a self,
    filter: &'a CohortFilter,
  ) -> impl Future<Output = Result<Vec<CohortCountRow>, Self::Error>> + Send + 'a;

  /// Baseline (`time_from_treatment_start = 0`) samples in `filter`.
  fn baseline_samples<'a>(
    &'a self,
    filter: &'a CohortFilter,
  ) -> impl Future<Output = Result<Vec<BaselineSampleRow>, Self::Error>> + Send + 'a;
}
