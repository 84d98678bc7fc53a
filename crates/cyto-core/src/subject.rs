//! Projects and subjects: the per-patient metadata carried by every input row.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A study project. One row per distinct `project` value in the input. The
/// store stamps `created_date` on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub project_id:  String,
  pub name:        String,
  pub description: String,
}

impl Project {
  pub const DEFAULT_DESCRIPTION: &'static str = "Cytometry analysis project";

  /// A project named after its identifier, as derived during a load.
  pub fn from_id(project_id: impl Into<String>) -> Self {
    let project_id = project_id.into();
    Self {
      name: project_id.clone(),
      project_id,
      description: Self::DEFAULT_DESCRIPTION.to_owned(),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Sex {
  #[serde(rename = "M")]
  Male,
  #[serde(rename = "F")]
  Female,
}

impl Sex {
  pub fn code(self) -> &'static str {
    match self {
      Self::Male => "M",
      Self::Female => "F",
    }
  }
}

impl FromStr for Sex {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "M" => Ok(Self::Male),
      "F" => Ok(Self::Female),
      other => Err(Error::UnknownSex(other.to_owned())),
    }
  }
}

impl fmt::Display for Sex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// A recorded treatment response. An absent response is `Option::None`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Response {
  Yes,
  No,
}

impl Response {
  pub fn code(self) -> &'static str {
    match self {
      Self::Yes => "yes",
      Self::No => "no",
    }
  }

  /// Parse an input cell; empty means the response was not recorded.
  pub fn parse_optional(s: &str) -> Result<Option<Self>> {
    match s.trim() {
      "" => Ok(None),
      other => other.parse().map(Some),
    }
  }

  pub fn group(self) -> ResponseGroup {
    match self {
      Self::Yes => ResponseGroup::Responder,
      Self::No => ResponseGroup::NonResponder,
    }
  }
}

impl FromStr for Response {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "yes" => Ok(Self::Yes),
      "no" => Ok(Self::No),
      other => Err(Error::UnknownResponse(other.to_owned())),
    }
  }
}

impl fmt::Display for Response {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// Presentation label for the two comparison groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseGroup {
  Responder,
  #[serde(rename = "Non-Responder")]
  NonResponder,
}

impl ResponseGroup {
  pub fn label(self) -> &'static str {
    match self {
      Self::Responder => "Responder",
      Self::NonResponder => "Non-Responder",
    }
  }
}

impl fmt::Display for ResponseGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// A study participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: String,
  pub project_id: String,
  pub condition:  String,
  pub age:        i64,
  pub sex:        Sex,
  pub treatment:  String,
  pub response:   Option<Response>,
}
