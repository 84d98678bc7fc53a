//! Report artifacts for a cytometry run.
//!
//! [`ReportWriter`] owns an output directory and writes the overview,
//! comparison and statistics tables (via `cyto-tabular`), the comparison box
//! plot as SVG, and the baseline summary as plain text.

mod baseline;
mod boxplot;

pub mod error;

use std::{
  fs::{self, File},
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};

use cyto_core::{
  analysis::{BaselineSummary, Comparison, OverviewRow},
  cohort::CohortFilter,
};

pub use baseline::write_baseline;
pub use boxplot::{BoxStats, write_boxplot};
pub use error::{Error, Result};

// ─── Public types ────────────────────────────────────────────────────────────

/// Everything a full run produces.
#[derive(Debug, Clone, Default)]
pub struct Reports {
  pub cohort:     CohortFilter,
  pub overview:   Vec<OverviewRow>,
  pub comparison: Comparison,
  pub baseline:   BaselineSummary,
}

/// One output file and whether it exists after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub file_name:   &'static str,
  pub description: &'static str,
  pub written:     bool,
}

pub const OVERVIEW_FILE: &str = "data_overview.csv";
pub const COMPARISON_FILE: &str = "cohort_comparison.csv";
pub const STATISTICS_FILE: &str = "statistical_results.csv";
pub const BOXPLOT_FILE: &str = "cohort_boxplot.svg";
pub const BASELINE_FILE: &str = "baseline_summary.txt";

// ─── Writer ──────────────────────────────────────────────────────────────────

pub struct ReportWriter {
  dir: PathBuf,
}

impl ReportWriter {
  /// Create `dir` (and parents) if needed.
  pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir).map_err(|source| Error::Io { path: dir.clone(), source })?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Write every artifact in order, then report which files exist.
  pub fn write_all(&self, reports: &Reports) -> Result<Vec<Artifact>> {
    self.write_overview(&reports.overview)?;
    self.write_comparison(&reports.comparison)?;
    self.write_statistics(&reports.comparison)?;
    self.write_boxplot(&reports.comparison, &reports.cohort)?;
    self.write_baseline(&reports.baseline, &reports.cohort)?;

    let artifacts: Vec<Artifact> = [
      (OVERVIEW_FILE, "Cell population frequencies per sample"),
      (COMPARISON_FILE, "Cohort cell counts with percentages"),
      (STATISTICS_FILE, "Responder vs non-responder test results"),
      (BOXPLOT_FILE, "Responder vs non-responder box plot"),
      (BASELINE_FILE, "Baseline sample summary"),
    ]
    .into_iter()
    .map(|(file_name, description)| Artifact {
      file_name,
      description,
      written: self.dir.join(file_name).is_file(),
    })
    .collect();

    tracing::info!(
      dir = %self.dir.display(),
      written = artifacts.iter().filter(|a| a.written).count(),
      "wrote reports"
    );
    Ok(artifacts)
  }

  pub fn write_overview(&self, rows: &[OverviewRow]) -> Result<PathBuf> {
    self.write_csv(OVERVIEW_FILE, |w| cyto_tabular::write_overview(w, rows))
  }

  pub fn write_comparison(&self, comparison: &Comparison) -> Result<PathBuf> {
    self.write_csv(COMPARISON_FILE, |w| {
      cyto_tabular::write_comparison_records(w, &comparison.records)
    })
  }

  pub fn write_statistics(&self, comparison: &Comparison) -> Result<PathBuf> {
    self.write_csv(STATISTICS_FILE, |w| {
      cyto_tabular::write_statistics(w, &comparison.statistics)
    })
  }

  pub fn write_boxplot(&self, comparison: &Comparison, cohort: &CohortFilter) -> Result<PathBuf> {
    self.write_text(BOXPLOT_FILE, |w| write_boxplot(w, comparison, cohort))
  }

  pub fn write_baseline(
    &self,
    summary: &BaselineSummary,
    cohort: &CohortFilter,
  ) -> Result<PathBuf> {
    self.write_text(BASELINE_FILE, |w| write_baseline(w, summary, cohort))
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn create(&self, file_name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = self.dir.join(file_name);
    let file = File::create(&path).map_err(|source| Error::Io { path: path.clone(), source })?;
    Ok((path, BufWriter::new(file)))
  }

  fn write_csv(
    &self,
    file_name: &str,
    write: impl FnOnce(&mut BufWriter<File>) -> cyto_tabular::Result<()>,
  ) -> Result<PathBuf> {
    let (path, mut out) = self.create(file_name)?;
    write(&mut out)?;
    out.flush().map_err(|source| Error::Io { path: path.clone(), source })?;
    tracing::debug!(path = %path.display(), "wrote table");
    Ok(path)
  }

  fn write_text(
    &self,
    file_name: &str,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
  ) -> Result<PathBuf> {
    let (path, mut out) = self.create(file_name)?;
    write(&mut out)
      .and_then(|()| out.flush())
      .map_err(|source| Error::Io { path: path.clone(), source })?;
    tracing::debug!(path = %path.display(), "wrote document");
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use cyto_core::{
    analysis::{ComparisonRecord, PlotPoint, PopulationStatistics},
    population::Population,
    subject::{Response, ResponseGroup},
  };

  use super::*;

  fn sample_reports() -> Reports {
    let record = |sample: &str, response: Response, pct: f64| ComparisonRecord {
      subject_id:                format!("sbj-{sample}"),
      response,
      sample_id:                 sample.into(),
      population:                Population::BCell,
      count:                     pct as u64,
      time_from_treatment_start: 0,
      total_count:               100,
      percentage:                Some(pct),
    };
    let records = vec![record("s1", Response::Yes, 10.0), record("s2", Response::No, 30.0)];
    let plot_points = records
      .iter()
      .map(|r| PlotPoint {
        population:  r.population,
        response:    r.response.group(),
        percentage:  r.percentage.unwrap_or_default(),
        total_count: r.total_count,
      })
      .collect();

    Reports {
      cohort:     CohortFilter::default(),
      overview:   vec![OverviewRow {
        sample:      "s1".into(),
        total_count: 100,
        population:  Population::BCell,
        count:       10,
        percentage:  Some(10.0),
      }],
      comparison: Comparison {
        records,
        statistics: vec![PopulationStatistics {
          population:          Population::BCell,
          responders_mean:     10.0,
          responders_std:      f64::NAN,
          non_responders_mean: 30.0,
          non_responders_std:  f64::NAN,
          mann_whitney_u:      0.0,
          p_value:             1.0,
          effect_size:         0.0,
          significant:         false,
          n_responders:        1,
          n_non_responders:    1,
        }],
        plot_points,
      },
      baseline:   BaselineSummary::default(),
    }
  }

  #[test]
  fn writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path().join("nested/output")).unwrap();
    let artifacts = writer.write_all(&sample_reports()).unwrap();

    let names: Vec<_> = artifacts.iter().map(|a| a.file_name).collect();
    assert_eq!(names, [OVERVIEW_FILE, COMPARISON_FILE, STATISTICS_FILE, BOXPLOT_FILE, BASELINE_FILE]);
    assert!(artifacts.iter().all(|a| a.written));

    let overview = std::fs::read_to_string(writer.dir().join(OVERVIEW_FILE)).unwrap();
    assert_eq!(overview.lines().count(), 2);
    let stats = std::fs::read_to_string(writer.dir().join(STATISTICS_FILE)).unwrap();
    assert_eq!(stats.lines().nth(1), Some("b_cell,10,,30,,0,1,0,false,1,1"));
    let svg = std::fs::read_to_string(writer.dir().join(BOXPLOT_FILE)).unwrap();
    assert!(svg.contains(ResponseGroup::NonResponder.label()));
  }

  #[test]
  fn empty_reports_still_write_headers() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();
    let artifacts = writer.write_all(&Reports::default()).unwrap();
    assert!(artifacts.iter().all(|a| a.written));

    let comparison = std::fs::read_to_string(dir.path().join(COMPARISON_FILE)).unwrap();
    assert_eq!(comparison.lines().count(), 1);
  }

  #[test]
  fn unwritable_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();
    let err = ReportWriter::new(blocker.join("out")).err().unwrap();
    assert!(matches!(err, Error::Io { .. }));
  }
}
