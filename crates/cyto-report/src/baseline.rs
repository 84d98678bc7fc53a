//! Plain-text rendering of a [`BaselineSummary`].

use std::{fmt::Display, io::Write};

use cyto_core::{analysis::BaselineSummary, cohort::CohortFilter};

const RULE_WIDTH: usize = 50;

/// Write the baseline summary as an indented plain-text report.
pub fn write_baseline<W: Write>(
  out: &mut W,
  summary: &BaselineSummary,
  cohort: &CohortFilter,
) -> std::io::Result<()> {
  writeln!(out, "Baseline Analysis: {}", cohort.describe())?;
  writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
  writeln!(out)?;
  writeln!(out, "Total samples: {}", summary.total_samples)?;
  writeln!(out, "Unique subjects: {}", summary.unique_subjects)?;

  section(out, "Samples by project", &summary.samples_by_project)?;
  section(out, "Subjects by response", &summary.subjects_by_response)?;
  section(out, "Subjects by sex", &summary.subjects_by_sex)?;
  Ok(())
}

fn section<'a, W, K>(
  out: &mut W,
  title: &str,
  counts: impl IntoIterator<Item = (&'a K, &'a usize)>,
) -> std::io::Result<()>
where
  W: Write,
  K: Display + 'a,
{
  writeln!(out)?;
  writeln!(out, "{title}:")?;
  let mut any = false;
  for (key, count) in counts {
    writeln!(out, "  {key}: {count}")?;
    any = true;
  }
  if !any {
    writeln!(out, "  (none)")?;
  }
  Ok(())
}
