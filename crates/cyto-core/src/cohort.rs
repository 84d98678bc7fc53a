//! Cohort filters shared by the comparison and baseline analyses.

use serde::{Deserialize, Serialize};

/// Selects subjects by condition and treatment, and their samples by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFilter {
  pub condition:   String,
  pub treatment:   String,
  pub sample_type: String,
}

impl CohortFilter {
  pub fn new(
    condition: impl Into<String>,
    treatment: impl Into<String>,
    sample_type: impl Into<String>,
  ) -> Self {
    Self {
      condition:   condition.into(),
      treatment:   treatment.into(),
      sample_type: sample_type.into(),
    }
  }

  /// Short human-readable form, e.g. `melanoma / miraclib / PBMC`.
  pub fn describe(&self) -> String {
    format!("{} / {} / {}", self.condition, self.treatment, self.sample_type)
  }
}

/// The reference cohort: melanoma patients on miraclib, PBMC samples.
impl Default for CohortFilter {
  fn default() -> Self { Self::new("melanoma", "miraclib", "PBMC") }
}
