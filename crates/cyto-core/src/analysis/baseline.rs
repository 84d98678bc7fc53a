//! Tabulation of baseline samples within a cohort.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
  cohort::CohortFilter,
  store::{BaselineSampleRow, CytometryStore},
  subject::{Response, Sex},
};

/// Counts over the baseline (`time_from_treatment_start = 0`) samples of a
/// cohort. The default value is the summary of an empty cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSummary {
  pub total_samples:        usize,
  pub unique_subjects:      usize,
  /// Samples per project.
  pub samples_by_project:   BTreeMap<String, usize>,
  /// Distinct subjects per recorded response; absent responses are not
  /// counted.
  pub subjects_by_response: BTreeMap<Response, usize>,
  /// Distinct subjects per sex.
  pub subjects_by_sex:      BTreeMap<Sex, usize>,
}

impl BaselineSummary {
  pub fn is_empty(&self) -> bool { self.total_samples == 0 }
}

pub fn baseline_from_rows(rows: &[BaselineSampleRow]) -> BaselineSummary {
  let mut summary = BaselineSummary { total_samples: rows.len(), ..Default::default() };

  let mut subjects: BTreeSet<&str> = BTreeSet::new();
  for row in rows {
    *summary.samples_by_project.entry(row.project_id.clone()).or_default() += 1;

    // Per-subject tallies count each subject once.
    if subjects.insert(row.subject_id.as_str()) {
      if let Some(response) = row.response {
        *summary.subjects_by_response.entry(response).or_default() += 1;
      }
      *summary.subjects_by_sex.entry(row.sex).or_default() += 1;
    }
  }
  summary.unique_subjects = subjects.len();
  summary
}

/// Summarise the baseline samples of `filter`.
pub async fn baseline_summary<S: CytometryStore>(
  store: &S,
  filter: &CohortFilter,
) -> Result<BaselineSummary, S::Error> {
  let rows = store.baseline_samples(filter).await?;
  tracing::debug!(cohort = %filter.describe(), samples = rows.len(), "summarising baseline");
  Ok(baseline_from_rows(&rows))
}
