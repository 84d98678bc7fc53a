//! [`SqliteStore`], the SQLite implementation of [`CytometryStore`].

use std::{collections::HashSet, path::Path};

use cyto_core::{
  cohort::CohortFilter,
  population::Population,
  sample::Sample,
  store::{BaselineSampleRow, CohortCountRow, CountRow, CytometryStore, LoadReport, StoreSummary},
  subject::{Project, Subject},
};
use cyto_tabular::InputRecord;

use crate::{
  Error, Result,
  encode::{
    RawBaselineSample, RawCohortCount, RawCount, RawPopulation, decode_total, encode_count,
  },
  schema::{RELOAD_TABLES, SCHEMA, TABLES},
};

/// One row of the `cell_populations` reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRow {
  pub population:   Population,
  pub display_name: String,
  pub description:  String,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A cytometry store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an existing store for reading only. No DDL or reference-row
  /// upsert is issued, and every write fails.
  pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
    let flags =
      rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = tokio_rusqlite::Connection::open_with_flags(path, flags).await?;

    let present: Vec<String> = conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
      })
      .await?;
    if let Some(missing) = TABLES.iter().find(|t| !present.iter().any(|p| p == *t)) {
      return Err(Error::MissingSchema((*missing).to_owned()));
    }

    Ok(Self { conn })
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Create tables and indexes if missing and upsert the population
  /// reference rows. Safe to run against an already-initialised file.
  pub async fn init_schema(&self) -> Result<()> {
    let populations: Vec<_> = Population::all()
      .map(|p| (p.id(), p.display_name(), p.description()))
      .collect();

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        let mut stmt = conn.prepare(
          "INSERT OR REPLACE INTO cell_populations (population_id, display_name, description)
           VALUES (?1, ?2, ?3)",
        )?;
        for (id, name, description) in populations {
          stmt.execute(rusqlite::params![id, name, description])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Insert a single cell count outside of a bulk load.
  pub async fn insert_cell_count(
    &self,
    sample_id: &str,
    population: Population,
    count: u64,
  ) -> Result<()> {
    let sample_id = sample_id.to_owned();
    let count = encode_count(count)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cell_counts (sample_id, population_id, count) VALUES (?1, ?2, ?3)",
          rusqlite::params![sample_id, population.id(), count],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The population reference table, in [`Population::all`] order.
  pub async fn population_rows(&self) -> Result<Vec<PopulationRow>> {
    let raws: Vec<RawPopulation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT population_id, display_name, description FROM cell_populations",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPopulation {
              population_id: row.get(0)?,
              display_name:  row.get(1)?,
              description:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut rows = raws.into_iter().map(RawPopulation::into_row).collect::<Result<Vec<_>>>()?;
    rows.sort_by_key(|r| r.population);
    Ok(rows)
  }
}

// ─── Load batch ──────────────────────────────────────────────────────────────

/// Normalised rows derived from the input file, ready to insert.
struct LoadBatch {
  projects:    Vec<Project>,
  subjects:    Vec<Subject>,
  samples:     Vec<Sample>,
  /// `(sample_id, population_id, count)`
  cell_counts: Vec<(String, &'static str, i64)>,
}

impl LoadBatch {
  /// Projects and subjects keep their first-seen order and attributes.
  fn from_records(records: &[InputRecord]) -> Result<Self> {
    let mut seen_projects = HashSet::new();
    let mut seen_subjects = HashSet::new();
    let mut batch = Self {
      projects:    Vec::new(),
      subjects:    Vec::new(),
      samples:     Vec::with_capacity(records.len()),
      cell_counts: Vec::with_capacity(records.len() * Population::all().count()),
    };

    for r in records {
      if seen_projects.insert(r.project.as_str()) {
        batch.projects.push(Project::from_id(&r.project));
      }
      if seen_subjects.insert(r.subject.as_str()) {
        batch.subjects.push(Subject {
          subject_id: r.subject.clone(),
          project_id: r.project.clone(),
          condition:  r.condition.clone(),
          age:        r.age,
          sex:        r.sex,
          treatment:  r.treatment.clone(),
          response:   r.response,
        });
      }
      batch.samples.push(Sample {
        sample_id:                 r.sample.clone(),
        subject_id:                r.subject.clone(),
        sample_type:               r.sample_type.clone(),
        time_from_treatment_start: r.time_from_treatment_start,
        collection_date:           None,
      });
      for (population, count) in r.cell_counts() {
        batch.cell_counts.push((r.sample.clone(), population.id(), encode_count(count)?));
      }
    }
    Ok(batch)
  }

  fn report(&self, rows: usize) -> LoadReport {
    LoadReport {
      rows,
      projects: self.projects.len(),
      subjects: self.subjects.len(),
      samples: self.samples.len(),
      cell_counts: self.cell_counts.len(),
    }
  }

  /// Replace the store contents inside one transaction. Dropping the
  /// transaction on any error rolls it back.
  fn write(self, conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for table in RELOAD_TABLES {
      tx.execute(&format!("DELETE FROM {table}"), [])?;
    }
    {
      let mut stmt = tx.prepare(
        "INSERT INTO projects (project_id, name, description) VALUES (?1, ?2, ?3)",
      )?;
      for p in &self.projects {
        stmt.execute(rusqlite::params![p.project_id, p.name, p.description])?;
      }

      let mut stmt = tx.prepare(
        "INSERT INTO subjects
           (subject_id, project_id, condition, age, sex, treatment, response)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      )?;
      for s in &self.subjects {
        stmt.execute(rusqlite::params![
          s.subject_id,
          s.project_id,
          s.condition,
          s.age,
          s.sex.code(),
          s.treatment,
          s.response.map(|r| r.code()),
        ])?;
      }

      let mut stmt = tx.prepare(
        "INSERT INTO samples
           (sample_id, subject_id, sample_type, time_from_treatment_start, collection_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
      )?;
      for s in &self.samples {
        stmt.execute(rusqlite::params![
          s.sample_id,
          s.subject_id,
          s.sample_type,
          s.time_from_treatment_start,
          s.collection_date.map(|d| d.to_string()),
        ])?;
      }

      let mut stmt = tx.prepare(
        "INSERT INTO cell_counts (sample_id, population_id, count) VALUES (?1, ?2, ?3)",
      )?;
      for (sample_id, population_id, count) in &self.cell_counts {
        stmt.execute(rusqlite::params![sample_id, population_id, count])?;
      }
    }
    tx.commit()
  }
}

// ─── CytometryStore impl ─────────────────────────────────────────────────────

impl CytometryStore for SqliteStore {
  type Error = crate::Error;

  async fn load<'a>(&'a self, path: &'a Path) -> Result<LoadReport> {
    let records = cyto_tabular::read_input(path)?;
    let batch = LoadBatch::from_records(&records)?;
    let report = batch.report(records.len());

    self
      .conn
      .call(move |conn| {
        batch.write(conn)?;
        Ok(())
      })
      .await?;

    tracing::info!(
      rows = report.rows,
      projects = report.projects,
      subjects = report.subjects,
      samples = report.samples,
      cell_counts = report.cell_counts,
      "loaded input into store"
    );
    Ok(report)
  }

  async fn sample_summary(&self) -> Result<StoreSummary> {
    let totals: [i64; 5] = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(DISTINCT p.project_id),
                  COUNT(DISTINCT sub.subject_id),
                  COUNT(DISTINCT s.sample_id),
                  COUNT(DISTINCT sub.condition),
                  COUNT(DISTINCT sub.treatment)
           FROM projects p
           JOIN subjects sub ON sub.project_id = p.project_id
           JOIN samples s    ON s.subject_id   = sub.subject_id",
          [],
          |row| Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?]),
        )?)
      })
      .await?;

    let [projects, subjects, samples, conditions, treatments] = totals;
    Ok(StoreSummary {
      projects:   decode_total(projects)?,
      subjects:   decode_total(subjects)?,
      samples:    decode_total(samples)?,
      conditions: decode_total(conditions)?,
      treatments: decode_total(treatments)?,
    })
  }

  async fn cell_counts(&self) -> Result<Vec<CountRow>> {
    let raws: Vec<RawCount> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT sample_id, population_id, count FROM cell_counts
           ORDER BY sample_id, population_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCount {
              sample_id:     row.get(0)?,
              population_id: row.get(1)?,
              count:         row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCount::into_row).collect()
  }

  async fn cohort_counts<'a>(&'a self, filter: &'a CohortFilter) -> Result<Vec<CohortCountRow>> {
    let CohortFilter { condition, treatment, sample_type } = filter.clone();

    let raws: Vec<RawCohortCount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sub.subject_id, sub.response, s.sample_id, c.population_id, c.count,
                  s.time_from_treatment_start
           FROM cell_counts c
           JOIN samples s    ON s.sample_id    = c.sample_id
           JOIN subjects sub ON sub.subject_id = s.subject_id
           WHERE sub.condition = ?1
             AND sub.treatment = ?2
             AND s.sample_type = ?3
             AND sub.response IS NOT NULL
           ORDER BY s.sample_id, c.population_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![condition, treatment, sample_type], |row| {
            Ok(RawCohortCount {
              subject_id:                row.get(0)?,
              response:                  row.get(1)?,
              sample_id:                 row.get(2)?,
              population_id:             row.get(3)?,
              count:                     row.get(4)?,
              time_from_treatment_start: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCohortCount::into_row).collect()
  }

  async fn baseline_samples<'a>(
    &'a self,
    filter: &'a CohortFilter,
  ) -> Result<Vec<BaselineSampleRow>> {
    let CohortFilter { condition, treatment, sample_type } = filter.clone();

    let raws: Vec<RawBaselineSample> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sub.project_id, sub.subject_id, sub.response, sub.sex, s.sample_id
           FROM samples s
           JOIN subjects sub ON sub.subject_id = s.subject_id
           WHERE sub.condition = ?1
             AND sub.treatment = ?2
             AND s.sample_type = ?3
             AND s.time_from_treatment_start = 0
           ORDER BY s.sample_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![condition, treatment, sample_type], |row| {
            Ok(RawBaselineSample {
              project_id: row.get(0)?,
              subject_id: row.get(1)?,
              response:   row.get(2)?,
              sex:        row.get(3)?,
              sample_id:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBaselineSample::into_row).collect()
  }
}
