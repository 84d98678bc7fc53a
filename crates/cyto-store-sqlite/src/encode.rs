//! Conversions between domain types and the plain-text / integer columns
//! stored in SQLite.
//!
//! Enums are stored as their short codes (`b_cell`, `M`, `yes`). Counts are
//! stored as `INTEGER` and range-checked on the way in and out.

use cyto_core::{
  population::Population,
  store::{BaselineSampleRow, CohortCountRow, CountRow},
  subject::{Response, Sex},
};

use crate::{Error, Result, store::PopulationRow};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_count(count: u64) -> Result<i64> {
  i64::try_from(count).map_err(|_| Error::Decode(format!("count {count} exceeds INTEGER range")))
}

pub fn decode_count(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::Decode(format!("negative count: {raw}")))
}

pub fn decode_total(raw: i64) -> Result<usize> {
  usize::try_from(raw).map_err(|_| Error::Decode(format!("invalid total: {raw}")))
}

pub fn decode_response(raw: Option<&str>) -> Result<Option<Response>> {
  Ok(raw.map(str::parse).transpose()?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub struct RawCount {
  pub sample_id:     String,
  pub population_id: String,
  pub count:         i64,
}

impl RawCount {
  pub fn into_row(self) -> Result<CountRow> {
    Ok(CountRow {
      sample_id:  self.sample_id,
      population: self.population_id.parse()?,
      count:      decode_count(self.count)?,
    })
  }
}

pub struct RawCohortCount {
  pub subject_id:                String,
  pub response:                  String,
  pub sample_id:                 String,
  pub population_id:             String,
  pub count:                     i64,
  pub time_from_treatment_start: i64,
}

impl RawCohortCount {
  pub fn into_row(self) -> Result<CohortCountRow> {
    Ok(CohortCountRow {
      subject_id:                self.subject_id,
      response:                  self.response.parse()?,
      sample_id:                 self.sample_id,
      population:                self.population_id.parse()?,
      count:                     decode_count(self.count)?,
      time_from_treatment_start: self.time_from_treatment_start,
    })
  }
}

pub struct RawBaselineSample {
  pub project_id: String,
  pub subject_id: String,
  pub response:   Option<String>,
  pub sex:        String,
  pub sample_id:  String,
}

impl RawBaselineSample {
  pub fn into_row(self) -> Result<BaselineSampleRow> {
    Ok(BaselineSampleRow {
      project_id: self.project_id,
      subject_id: self.subject_id,
      response:   decode_response(self.response.as_deref())?,
      sex:        self.sex.parse::<Sex>()?,
      sample_id:  self.sample_id,
    })
  }
}

pub struct RawPopulation {
  pub population_id: String,
  pub display_name:  String,
  pub description:   String,
}

impl RawPopulation {
  pub fn into_row(self) -> Result<PopulationRow> {
    Ok(PopulationRow {
      population:   self.population_id.parse::<Population>()?,
      display_name: self.display_name,
      description:  self.description,
    })
  }
}
