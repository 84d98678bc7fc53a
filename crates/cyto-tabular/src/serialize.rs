//! CSV serialisation of analysis tables.
//!
//! Undefined percentages and non-finite statistics (e.g. the standard
//! deviation of a single observation) are written as empty fields.

use std::io::Write;

use csv::Writer;
use cyto_core::analysis::{ComparisonRecord, OverviewRow, PopulationStatistics};

use crate::Result;

fn float(v: f64) -> String {
  if v.is_finite() { v.to_string() } else { String::new() }
}

fn opt_float(v: Option<f64>) -> String { v.map(float).unwrap_or_default() }

/// `sample,total_count,population,count,percentage`
pub fn write_overview<W: Write>(out: W, rows: &[OverviewRow]) -> Result<()> {
  let mut w = Writer::from_writer(out);
  w.write_record(["sample", "total_count", "population", "count", "percentage"])?;
  for r in rows {
    w.write_record([
      r.sample.clone(),
      r.total_count.to_string(),
      r.population.id().to_owned(),
      r.count.to_string(),
      opt_float(r.percentage),
    ])?;
  }
  w.flush()?;
  Ok(())
}

/// The overview table as an in-memory CSV document.
pub fn overview_to_string(rows: &[OverviewRow]) -> Result<String> {
  let mut buf = Vec::new();
  write_overview(&mut buf, rows)?;
  // Every field is built from UTF-8 strings.
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// One row per cohort cell count, with sample totals and percentages.
pub fn write_comparison_records<W: Write>(out: W, records: &[ComparisonRecord]) -> Result<()> {
  let mut w = Writer::from_writer(out);
  w.write_record([
    "subject_id",
    "response",
    "sample_id",
    "population_id",
    "count",
    "time_from_treatment_start",
    "total_count",
    "percentage",
  ])?;
  for r in records {
    w.write_record([
      r.subject_id.clone(),
      r.response.code().to_owned(),
      r.sample_id.clone(),
      r.population.id().to_owned(),
      r.count.to_string(),
      r.time_from_treatment_start.to_string(),
      r.total_count.to_string(),
      opt_float(r.percentage),
    ])?;
  }
  w.flush()?;
  Ok(())
}

/// One row per tested population.
pub fn write_statistics<W: Write>(out: W, statistics: &[PopulationStatistics]) -> Result<()> {
  let mut w = Writer::from_writer(out);
  w.write_record([
    "population",
    "responders_mean",
    "responders_std",
    "non_responders_mean",
    "non_responders_std",
    "mann_whitney_u",
    "p_value",
    "effect_size",
    "significant",
    "n_responders",
    "n_non_responders",
  ])?;
  for s in statistics {
    w.write_record([
      s.population.id().to_owned(),
      float(s.responders_mean),
      float(s.responders_std),
      float(s.non_responders_mean),
      float(s.non_responders_std),
      float(s.mann_whitney_u),
      float(s.p_value),
      float(s.effect_size),
      s.significant.to_string(),
      s.n_responders.to_string(),
      s.n_non_responders.to_string(),
    ])?;
  }
  w.flush()?;
  Ok(())
}
