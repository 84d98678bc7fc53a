//! The closed set of cell populations counted per sample.
//!
//! The store keeps a `cell_populations` table for referential integrity, but
//! the set itself never changes at runtime, so it is modelled as an enum.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One of the five immune cell populations in the input file.
///
/// The string form (`b_cell`, `cd8_t_cell`, ...) is both the input column
/// name and the `population_id` stored in SQLite.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Population {
  BCell,
  #[serde(rename = "cd8_t_cell")]
  Cd8TCell,
  #[serde(rename = "cd4_t_cell")]
  Cd4TCell,
  NkCell,
  Monocyte,
}

impl Population {
  pub const ALL: [Population; 5] = [
    Self::BCell,
    Self::Cd8TCell,
    Self::Cd4TCell,
    Self::NkCell,
    Self::Monocyte,
  ];

  /// All populations in input-column order.
  pub fn all() -> impl Iterator<Item = Population> { Self::ALL.into_iter() }

  pub fn id(self) -> &'static str {
    match self {
      Self::BCell => "b_cell",
      Self::Cd8TCell => "cd8_t_cell",
      Self::Cd4TCell => "cd4_t_cell",
      Self::NkCell => "nk_cell",
      Self::Monocyte => "monocyte",
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Self::BCell => "B Cell",
      Self::Cd8TCell => "CD8+ T Cell",
      Self::Cd4TCell => "CD4+ T Cell",
      Self::NkCell => "NK Cell",
      Self::Monocyte => "Monocyte",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Self::BCell => "B lymphocytes",
      Self::Cd8TCell => "Cytotoxic T lymphocytes",
      Self::Cd4TCell => "Helper T lymphocytes",
      Self::NkCell => "Natural killer cells",
      Self::Monocyte => "Monocytes/macrophages",
    }
  }
}

impl fmt::Display for Population {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

impl FromStr for Population {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::all()
      .find(|p| p.id() == s)
      .ok_or_else(|| Error::UnknownPopulation(s.to_owned()))
  }
}
