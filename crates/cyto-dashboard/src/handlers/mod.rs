//! Route handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | HTML page |
//! | `GET`  | `/api/summary` | distinct projects, subjects, samples, ... |
//! | `GET`  | `/api/overview` | every (sample, population) frequency |
//! | `GET`  | `/api/overview.csv` | same, as a CSV attachment |
//! | `GET`  | `/api/population-averages` | mean percentage per population |
//! | `GET`  | `/api/comparison` | cohort query params, see [`CohortParams`] |
//! | `GET`  | `/api/baseline` | cohort query params, see [`CohortParams`] |

pub mod baseline;
pub mod comparison;
pub mod index;
pub mod overview;
pub mod summary;

use cyto_core::cohort::CohortFilter;
use serde::Deserialize;

use crate::error::ApiError;

/// Optional cohort overrides; anything omitted falls back to the configured
/// cohort.
#[derive(Debug, Default, Deserialize)]
pub struct CohortParams {
  pub condition:   Option<String>,
  pub treatment:   Option<String>,
  pub sample_type: Option<String>,
}

impl CohortParams {
  pub fn resolve(self, default: &CohortFilter) -> Result<CohortFilter, ApiError> {
    fn pick(name: &str, value: Option<String>, default: &str) -> Result<String, ApiError> {
      match value {
        None => Ok(default.to_owned()),
        Some(v) if v.trim().is_empty() => {
          Err(ApiError::BadRequest(format!("`{name}` must not be empty")))
        }
        Some(v) => Ok(v.trim().to_owned()),
      }
    }

    Ok(CohortFilter {
      condition:   pick("condition", self.condition, &default.condition)?,
      treatment:   pick("treatment", self.treatment, &default.treatment)?,
      sample_type: pick("sample_type", self.sample_type, &default.sample_type)?,
    })
  }
}
