//! Relative frequency of every population in every sample.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  population::Population,
  sample::percentage,
  stats,
  store::{CountRow, CytometryStore},
};

/// One (sample, population) pair with its share of the sample total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
  pub sample:      String,
  pub total_count: u64,
  pub population:  Population,
  pub count:       u64,
  /// `None` when the sample's total count is zero.
  pub percentage:  Option<f64>,
}

/// Sum of counts per sample id. Saturates at `u64::MAX`.
pub(crate) fn sample_totals<'a>(
  rows: impl IntoIterator<Item = (&'a str, u64)>,
) -> HashMap<&'a str, u64> {
  let mut totals: HashMap<&str, u64> = HashMap::new();
  for (sample, count) in rows {
    let total = totals.entry(sample).or_default();
    *total = total.saturating_add(count);
  }
  totals
}

/// Compute totals and percentages, preserving the input order.
pub fn overview_from_rows(rows: Vec<CountRow>) -> Vec<OverviewRow> {
  let totals = sample_totals(rows.iter().map(|r| (r.sample_id.as_str(), r.count)));

  let zero_total = totals.values().filter(|&&t| t == 0).count();
  if zero_total > 0 {
    tracing::warn!(samples = zero_total, "samples with zero total count have no percentages");
  }

  rows
    .iter()
    .map(|r| {
      let total = totals.get(r.sample_id.as_str()).copied().unwrap_or_default();
      OverviewRow {
        sample:      r.sample_id.clone(),
        total_count: total,
        population:  r.population,
        count:       r.count,
        percentage:  percentage(r.count, total),
      }
    })
    .collect()
}

/// Relative frequencies for every loaded sample, ordered by sample then
/// population id.
pub async fn data_overview<S: CytometryStore>(
  store: &S,
) -> Result<Vec<OverviewRow>, S::Error> {
  let rows = store.cell_counts().await?;
  tracing::debug!(rows = rows.len(), "computing data overview");
  Ok(overview_from_rows(rows))
}

/// Mean percentage of one population across all samples with a defined
/// percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationAverage {
  pub population:         Population,
  pub average_percentage: f64,
  pub samples:            usize,
}

/// Per-population mean percentage, highest first. Populations without any
/// defined percentage are left out.
pub fn population_averages(rows: &[OverviewRow]) -> Vec<PopulationAverage> {
  let mut averages: Vec<PopulationAverage> = Population::all()
    .filter_map(|population| {
      let values: Vec<f64> = rows
        .iter()
        .filter(|r| r.population == population)
        .filter_map(|r| r.percentage)
        .collect();
      (!values.is_empty()).then(|| PopulationAverage {
        population,
        average_percentage: stats::mean(&values),
        samples: values.len(),
      })
    })
    .collect();
  averages.sort_by(|a, b| b.average_percentage.total_cmp(&a.average_percentage));
  averages
}
