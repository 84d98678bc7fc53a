//! Input file parser.
//!
//! Pipeline:
//!   path
//!     └─ read_input()       → FileNotFound check
//!          └─ parse_reader()   → header validation (all missing columns)
//!               └─ parse_row()    → InputRecord per data row

use std::{fs::File, io::Read, path::Path, str::FromStr};

use csv::{ReaderBuilder, StringRecord, Trim};
use cyto_core::{
  population::Population,
  subject::{Response, Sex},
};

use crate::{
  InputRecord,
  error::{Error, Result},
};

/// Columns the input file must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 15] = [
  "project",
  "subject",
  "condition",
  "age",
  "sex",
  "treatment",
  "response",
  "sample",
  "sample_type",
  "time_from_treatment_start",
  "b_cell",
  "cd8_t_cell",
  "cd4_t_cell",
  "nk_cell",
  "monocyte",
];

/// Largest per-sample total the store can hold.
const MAX_TOTAL: u64 = i64::MAX as u64;

/// Read and validate the input file at `path`.
pub fn read_input(path: impl AsRef<Path>) -> Result<Vec<InputRecord>> {
  let path = path.as_ref();
  if !path.is_file() {
    return Err(Error::FileNotFound(path.to_path_buf()));
  }
  let records = parse_reader(File::open(path)?)?;
  tracing::info!(rows = records.len(), path = %path.display(), "parsed input file");
  Ok(records)
}

/// Parse CSV content with a header row from any reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<InputRecord>> {
  let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

  let columns = ColumnIndex::from_headers(reader.headers()?)?;

  let mut records = Vec::new();
  for result in reader.records() {
    let row = result.map_err(csv_row_error)?;
    records.push(columns.parse_row(&row)?);
  }
  Ok(records)
}

/// Malformed rows become `Parse`; I/O failures stay `Csv`.
fn csv_row_error(e: csv::Error) -> Error {
  if e.is_io_error() {
    return Error::Csv(e);
  }
  let line = e.position().map(|p| p.line()).unwrap_or_default();
  Error::Parse { line, message: e.to_string() }
}

// ─── Column lookup ───────────────────────────────────────────────────────────

/// Position of every required column in the header row.
struct ColumnIndex {
  positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnIndex {
  fn from_headers(headers: &StringRecord) -> Result<Self> {
    let mut positions = [0usize; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
      match headers.iter().position(|h| h == name) {
        Some(i) => *slot = i,
        None => missing.push(name.to_owned()),
      }
    }
    if !missing.is_empty() {
      return Err(Error::SchemaValidation { missing });
    }
    Ok(Self { positions })
  }

  fn field<'r>(&self, row: &'r StringRecord, name: &str) -> &'r str {
    let slot = REQUIRED_COLUMNS
      .iter()
      .position(|c| *c == name)
      .map(|i| self.positions[i]);
    slot.and_then(|i| row.get(i)).unwrap_or_default()
  }

  fn parse_row(&self, row: &StringRecord) -> Result<InputRecord> {
    let line = row.position().map(|p| p.line()).unwrap_or_default();
    let text = |name: &str| -> Result<String> {
      let value = self.field(row, name);
      if value.is_empty() {
        return Err(Error::Parse { line, message: format!("column {name:?} is empty") });
      }
      Ok(value.to_owned())
    };
    let parse = |name: &'static str| ParseField { line, name, value: self.field(row, name) };

    let mut counts = [0u64; 5];
    for (slot, population) in counts.iter_mut().zip(Population::all()) {
      *slot = parse(population.id()).number()?;
    }
    let total = counts.iter().try_fold(0u64, |acc, &c| acc.checked_add(c));
    if total.is_none_or(|t| t > MAX_TOTAL) {
      return Err(Error::Parse {
        line,
        message: format!("population counts sum to more than {MAX_TOTAL}"),
      });
    }

    Ok(InputRecord {
      project: text("project")?,
      subject: text("subject")?,
      condition: text("condition")?,
      age: parse("age").number()?,
      sex: parse("sex").with(str::parse::<Sex>)?,
      treatment: text("treatment")?,
      response: parse("response").with(Response::parse_optional)?,
      sample: text("sample")?,
      sample_type: text("sample_type")?,
      time_from_treatment_start: parse("time_from_treatment_start").number()?,
      counts,
    })
  }
}

/// A single cell being decoded, carrying enough context for the error.
struct ParseField<'a> {
  line:  u64,
  name:  &'a str,
  value: &'a str,
}

impl ParseField<'_> {
  fn number<T: FromStr>(&self) -> Result<T> {
    self.value.parse().map_err(|_| self.error("an integer"))
  }

  fn with<T, E>(&self, f: impl FnOnce(&str) -> std::result::Result<T, E>) -> Result<T>
  where
    E: std::fmt::Display,
  {
    f(self.value).map_err(|e| Error::Parse {
      line:    self.line,
      message: format!("column {:?}: {e}", self.name),
    })
  }

  fn error(&self, expected: &str) -> Error {
    Error::Parse {
      line:    self.line,
      message: format!("column {:?}: expected {expected}, got {:?}", self.name, self.value),
    }
  }
}
