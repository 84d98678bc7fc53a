//! The pipeline stages driven by `main`.
//!
//! Each stage returns an [`anyhow::Result`] so the caller can print a
//! diagnostic and stop at the first failure.

use std::path::Path;

use anyhow::{Context as _, Result};
use cyto_core::{
  analysis::{baseline_summary, compare, data_overview},
  cohort::CohortFilter,
  store::{CytometryStore, LoadReport, StoreSummary},
};
use cyto_report::{Artifact, ReportWriter, Reports};
use cyto_store_sqlite::SqliteStore;

/// Stage 1: open the store at `db` and load `input` into it.
pub async fn load(input: &Path, db: &Path) -> Result<(SqliteStore, LoadReport, StoreSummary)> {
  anyhow::ensure!(input.is_file(), "input file not found at {}", input.display());

  let store = SqliteStore::open(db)
    .await
    .with_context(|| format!("failed to open store at {}", db.display()))?;
  let report = store
    .load(input)
    .await
    .with_context(|| format!("failed to load {}", input.display()))?;
  let summary = store.sample_summary().await.context("failed to summarise store")?;
  Ok((store, report, summary))
}

/// Stage 2: run the overview, comparison and baseline analyses.
pub async fn analyse<S>(store: &S, cohort: &CohortFilter) -> Result<Reports>
where
  S: CytometryStore,
  S::Error: From<cyto_core::Error>,
{
  let overview = data_overview(store).await.context("data overview failed")?;
  let comparison = compare(store, cohort).await.context("cohort comparison failed")?;
  let baseline = baseline_summary(store, cohort).await.context("baseline summary failed")?;
  Ok(Reports { cohort: cohort.clone(), overview, comparison, baseline })
}

/// Stage 3: write every artifact into `output`.
pub fn write(reports: &Reports, output: &Path) -> Result<Vec<Artifact>> {
  let writer = ReportWriter::new(output)?;
  Ok(writer.write_all(reports)?)
}
