//! Responder vs non-responder comparison within a cohort.
//!
//! For every population with at least one responder and one non-responder
//! percentage, runs a two-sided Mann-Whitney U test and derives an effect
//! size from its p-value (see [`stats::effect_size`]).

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  analysis::overview::sample_totals,
  cohort::CohortFilter,
  population::Population,
  sample::percentage,
  stats,
  store::{CohortCountRow, CytometryStore},
  subject::{Response, ResponseGroup},
};

// ─── Result types ────────────────────────────────────────────────────────────

/// One cohort cell count annotated with its sample total and percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
  pub subject_id:                String,
  pub response:                  Response,
  pub sample_id:                 String,
  pub population:                Population,
  pub count:                     u64,
  pub time_from_treatment_start: i64,
  pub total_count:               u64,
  pub percentage:                Option<f64>,
}

/// Test result and group descriptives for one population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationStatistics {
  pub population:          Population,
  pub responders_mean:     f64,
  pub responders_std:      f64,
  pub non_responders_mean: f64,
  pub non_responders_std:  f64,
  pub mann_whitney_u:      f64,
  pub p_value:             f64,
  pub effect_size:         f64,
  pub significant:         bool,
  pub n_responders:        usize,
  pub n_non_responders:    usize,
}

/// A single box-plot observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
  pub population:  Population,
  pub response:    ResponseGroup,
  pub percentage:  f64,
  pub total_count: u64,
}

/// Everything the comparison produces; all three parts are empty for an
/// empty cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
  pub records:     Vec<ComparisonRecord>,
  pub statistics:  Vec<PopulationStatistics>,
  pub plot_points: Vec<PlotPoint>,
}

impl Comparison {
  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn statistics_for(&self, population: Population) -> Option<&PopulationStatistics> {
    self.statistics.iter().find(|s| s.population == population)
  }

  /// Distinct samples in the cohort with the given response.
  pub fn sample_count(&self, response: Option<Response>) -> usize {
    let mut ids: Vec<&str> = self
      .records
      .iter()
      .filter(|r| response.is_none_or(|want| r.response == want))
      .map(|r| r.sample_id.as_str())
      .collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
  }
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Annotate rows with percentages, then test each population.
pub fn compare_from_rows(rows: Vec<CohortCountRow>) -> crate::Result<Comparison> {
  if rows.is_empty() {
    return Ok(Comparison::default());
  }

  let totals = sample_totals(rows.iter().map(|r| (r.sample_id.as_str(), r.count)));
  let records: Vec<ComparisonRecord> = rows
    .iter()
    .map(|r| {
      let total = totals.get(r.sample_id.as_str()).copied().unwrap_or_default();
      ComparisonRecord {
        subject_id:                r.subject_id.clone(),
        response:                  r.response,
        sample_id:                 r.sample_id.clone(),
        population:                r.population,
        count:                     r.count,
        time_from_treatment_start: r.time_from_treatment_start,
        total_count:               total,
        percentage:                percentage(r.count, total),
      }
    })
    .collect();

  // Populations in order of first appearance.
  let mut populations: Vec<Population> = Vec::new();
  for r in &records {
    if !populations.contains(&r.population) {
      populations.push(r.population);
    }
  }

  let mut statistics = Vec::new();
  let mut plot_points = Vec::new();

  for population in populations {
    let group = |response: Response| -> Vec<&ComparisonRecord> {
      records
        .iter()
        .filter(|r| r.population == population && r.response == response)
        .filter(|r| r.percentage.is_some())
        .collect()
    };
    let responders = group(Response::Yes);
    let non_responders = group(Response::No);

    if responders.is_empty() || non_responders.is_empty() {
      tracing::warn!(
        %population,
        responders = responders.len(),
        non_responders = non_responders.len(),
        "skipping population without both response groups"
      );
      continue;
    }

    let yes: Vec<f64> = responders.iter().filter_map(|r| r.percentage).collect();
    let no: Vec<f64> = non_responders.iter().filter_map(|r| r.percentage).collect();

    let test = stats::mann_whitney_u(&yes, &no)?;
    let effect_size = stats::effect_size(test.p_value, yes.len() + no.len())?;

    statistics.push(PopulationStatistics {
      population,
      responders_mean: stats::mean(&yes),
      responders_std: stats::sample_std(&yes),
      non_responders_mean: stats::mean(&no),
      non_responders_std: stats::sample_std(&no),
      mann_whitney_u: test.statistic,
      p_value: test.p_value,
      effect_size,
      significant: test.is_significant(),
      n_responders: yes.len(),
      n_non_responders: no.len(),
    });

    for r in responders.iter().chain(&non_responders) {
      if let Some(pct) = r.percentage {
        plot_points.push(PlotPoint {
          population,
          response: r.response.group(),
          percentage: pct,
          total_count: r.total_count,
        });
      }
    }
  }

  Ok(Comparison { records, statistics, plot_points })
}

/// Compare responders with non-responders in `filter`.
pub async fn compare<S>(store: &S, filter: &CohortFilter) -> Result<Comparison, S::Error>
where
  S: CytometryStore,
  S::Error: From<Error>,
{
  let rows = store.cohort_counts(filter).await?;
  tracing::debug!(cohort = %filter.describe(), rows = rows.len(), "comparing responders");
  Ok(compare_from_rows(rows)?)
}
