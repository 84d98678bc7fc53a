//! Samples and population percentages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One biological sample; exactly one per input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
  pub sample_id:                 String,
  pub subject_id:                String,
  pub sample_type:               String,
  /// Days relative to treatment start; zero marks a baseline sample.
  pub time_from_treatment_start: i64,
  pub collection_date:           Option<NaiveDate>,
}

/// Percentage of `count` within `total`, or `None` when the total is zero.
pub fn percentage(count: u64, total: u64) -> Option<f64> {
  (total > 0).then(|| count as f64 / total as f64 * 100.0)
}
