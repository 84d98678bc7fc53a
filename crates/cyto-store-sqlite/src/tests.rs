//! Integration tests for `SqliteStore` against in-memory and on-disk
//! databases.

use std::path::{Path, PathBuf};

use cyto_core::{
  analysis::{baseline_summary, compare, data_overview},
  cohort::CohortFilter,
  population::Population,
  store::CytometryStore,
  subject::{Response, Sex},
};
use tempfile::TempDir;

use crate::{Error, SqliteStore};

const HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,\
sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

const ROWS: &str = "\
prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,100,200,300,250,150
prj1,sbj1,melanoma,57,M,miraclib,yes,s2,PBMC,7,110,190,310,240,150
prj1,sbj2,melanoma,62,F,miraclib,no,s3,PBMC,0,300,100,100,100,400
prj2,sbj3,melanoma,45,F,miraclib,no,s4,WB,0,10,20,30,40,50
prj2,sbj4,carcinoma,70,M,phauximab,,s5,PBMC,0,5,5,5,5,5
";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Write `body` under the standard header into a fresh temp directory.
fn input(body: &str) -> (TempDir, PathBuf) {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cell-count.csv");
  std::fs::write(&path, format!("{HEADER}\n{body}")).unwrap();
  (dir, path)
}

async fn loaded(body: &str) -> SqliteStore {
  let s = store().await;
  let (_dir, path) = input(body);
  s.load(&path).await.unwrap();
  s
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn population_reference_rows_are_seeded() {
  let s = store().await;
  let rows = s.population_rows().await.unwrap();
  assert_eq!(rows.len(), 5);
  assert_eq!(rows[0].population, Population::BCell);
  assert_eq!(rows[1].display_name, "CD8+ T Cell");
  assert_eq!(rows[4].description, "Monocytes/macrophages");
}

#[tokio::test]
async fn init_schema_is_idempotent() {
  let s = loaded(ROWS).await;
  s.init_schema().await.unwrap();
  s.init_schema().await.unwrap();
  assert_eq!(s.population_rows().await.unwrap().len(), 5);
  assert_eq!(s.cell_counts().await.unwrap().len(), 25);
}

#[tokio::test]
async fn reopening_a_file_keeps_its_contents() {
  let (dir, path) = input(ROWS);
  let db = dir.path().join("cytometry.db");

  let s = SqliteStore::open(&db).await.unwrap();
  s.load(&path).await.unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open(&db).await.unwrap();
  assert_eq!(s.sample_summary().await.unwrap().samples, 5);
}

#[tokio::test]
async fn projects_are_stamped_with_a_created_date() {
  let (dir, path) = input(ROWS);
  let db = dir.path().join("cytometry.db");
  let s = SqliteStore::open(&db).await.unwrap();
  s.load(&path).await.unwrap();
  s.close().await.unwrap();

  let conn = rusqlite::Connection::open(&db).unwrap();
  let undated: i64 = conn
    .query_row("SELECT COUNT(*) FROM projects WHERE created_date IS NULL", [], |r| r.get(0))
    .unwrap();
  assert_eq!(undated, 0);
}

#[tokio::test]
async fn read_only_open_serves_queries_and_refuses_writes() {
  let (dir, path) = input(ROWS);
  let db = dir.path().join("cytometry.db");
  let s = SqliteStore::open(&db).await.unwrap();
  s.load(&path).await.unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open_read_only(&db).await.unwrap();
  assert_eq!(s.sample_summary().await.unwrap().samples, 5);
  assert_eq!(s.population_rows().await.unwrap().len(), 5);

  assert!(matches!(s.init_schema().await, Err(Error::Database(_))));
  assert!(s.load(&path).await.is_err());
  assert_eq!(s.cell_counts().await.unwrap().len(), 25);
}

#[tokio::test]
async fn read_only_open_requires_the_schema() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("other.db");
  rusqlite::Connection::open(&db)
    .unwrap()
    .execute_batch("CREATE TABLE unrelated (id INTEGER)")
    .unwrap();

  let err = SqliteStore::open_read_only(&db).await.err().unwrap();
  assert!(matches!(err, Error::MissingSchema(ref t) if t == "projects"), "{err}");
}

#[tokio::test]
async fn read_only_open_of_missing_file_fails() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("absent.db");
  assert!(SqliteStore::open_read_only(&db).await.is_err());
  assert!(!db.exists());
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_normalises_rows() {
  let s = store().await;
  let (_dir, path) = input(ROWS);
  let report = s.load(&path).await.unwrap();

  assert_eq!(report.rows, 5);
  assert_eq!(report.projects, 2);
  assert_eq!(report.subjects, 4);
  assert_eq!(report.samples, 5);
  assert_eq!(report.cell_counts, 25);

  let summary = s.sample_summary().await.unwrap();
  assert_eq!(summary.projects, 2);
  assert_eq!(summary.subjects, 4);
  assert_eq!(summary.samples, 5);
  assert_eq!(summary.conditions, 2);
  assert_eq!(summary.treatments, 2);
}

#[tokio::test]
async fn cell_counts_are_ordered_by_sample_then_population() {
  let s = loaded(ROWS).await;
  let counts = s.cell_counts().await.unwrap();
  let first: Vec<_> = counts.iter().take(5).map(|c| (c.sample_id.as_str(), c.population)).collect();
  assert_eq!(first, [
    ("s1", Population::BCell),
    ("s1", Population::Cd4TCell),
    ("s1", Population::Cd8TCell),
    ("s1", Population::Monocyte),
    ("s1", Population::NkCell),
  ]);
  assert_eq!(counts[1].count, 300);
}

#[tokio::test]
async fn reload_replaces_previous_contents() {
  let s = loaded(ROWS).await;
  let (_dir, path) = input("prj9,sbj9,melanoma,30,F,miraclib,no,s9,PBMC,0,1,1,1,1,1\n");
  let report = s.load(&path).await.unwrap();
  assert_eq!(report.samples, 1);

  let summary = s.sample_summary().await.unwrap();
  assert_eq!(summary.projects, 1);
  assert_eq!(summary.samples, 1);
  assert_eq!(s.cell_counts().await.unwrap().len(), 5);
}

#[tokio::test]
async fn loading_the_same_file_twice_is_stable() {
  let s = store().await;
  let (_dir, path) = input(ROWS);
  let first = s.load(&path).await.unwrap();
  let second = s.load(&path).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(s.cell_counts().await.unwrap().len(), 25);
}

#[tokio::test]
async fn first_seen_subject_attributes_win() {
  let s = loaded(
    "prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,1,1,1,1,1\n\
     prj1,sbj1,melanoma,99,M,miraclib,no,s2,PBMC,0,1,1,1,1,1\n",
  )
  .await;
  let rows = s.baseline_samples(&CohortFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.response == Some(Response::Yes)));
}

#[tokio::test]
async fn missing_input_is_reported() {
  let s = store().await;
  let err = s.load(Path::new("/nonexistent/cell-count.csv")).await.unwrap_err();
  assert!(matches!(err, Error::Input(cyto_tabular::Error::FileNotFound(_))));
}

#[tokio::test]
async fn duplicate_sample_rolls_back_and_keeps_prior_data() {
  let s = loaded(ROWS).await;
  let (_dir, path) = input(
    "prj1,sbj1,melanoma,57,M,miraclib,yes,dup,PBMC,0,1,1,1,1,1\n\
     prj1,sbj1,melanoma,57,M,miraclib,yes,dup,PBMC,7,1,1,1,1,1\n",
  );
  let err = s.load(&path).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "{err}");

  let summary = s.sample_summary().await.unwrap();
  assert_eq!(summary.samples, 5);
  assert_eq!(s.cell_counts().await.unwrap().len(), 25);
}

#[tokio::test]
async fn invalid_input_leaves_store_untouched() {
  let s = loaded(ROWS).await;
  let (_dir, path) = input("prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,x,1,1,1,1\n");
  let err = s.load(&path).await.unwrap_err();
  assert!(matches!(err, Error::Input(cyto_tabular::Error::Parse { .. })));
  assert_eq!(s.sample_summary().await.unwrap().samples, 5);
}

#[tokio::test]
async fn overflowing_sample_total_is_rejected_before_analysis() {
  let s = loaded(ROWS).await;
  let max = i64::MAX;
  let (_dir, path) = input(&format!(
    "prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,{max},{max},{max},{max},{max}\n"
  ));
  let err = s.load(&path).await.unwrap_err();
  assert!(matches!(err, Error::Input(cyto_tabular::Error::Parse { .. })), "{err}");

  let rows = data_overview(&s).await.unwrap();
  assert_eq!(rows.len(), 25);
  assert!(rows.iter().all(|r| r.sample != "s1" || r.total_count == 1000));
}

#[tokio::test]
async fn largest_storable_total_loads_and_analyses() {
  let max = i64::MAX;
  let s = loaded(&format!(
    "prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,{max},0,0,0,0\n\
     prj1,sbj2,melanoma,62,F,miraclib,no,s2,PBMC,0,0,{max},0,0,0\n"
  ))
  .await;

  let rows = data_overview(&s).await.unwrap();
  assert_eq!(rows.len(), 10);
  assert!(rows.iter().all(|r| r.total_count == max as u64));
  assert_eq!(rows[0].percentage, Some(100.0));

  let comparison = compare(&s, &CohortFilter::default()).await.unwrap();
  assert_eq!(comparison.plot_points.len(), 10);
}

// ─── Referential integrity ───────────────────────────────────────────────────

#[tokio::test]
async fn cell_count_for_unknown_sample_is_rejected() {
  let s = loaded(ROWS).await;
  let err = s.insert_cell_count("no-such-sample", Population::BCell, 1).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "{err}");
}

#[tokio::test]
async fn duplicate_cell_count_is_rejected() {
  let s = loaded(ROWS).await;
  let err = s.insert_cell_count("s1", Population::BCell, 1).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "{err}");
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cohort_counts_respect_filter_and_response() {
  let s = loaded(ROWS).await;
  let rows = s.cohort_counts(&CohortFilter::default()).await.unwrap();
  // s1, s2, s3: melanoma / miraclib / PBMC with a recorded response.
  assert_eq!(rows.len(), 15);
  assert!(rows.iter().all(|r| r.sample_id != "s4" && r.sample_id != "s5"));
  assert_eq!(rows.iter().find(|r| r.sample_id == "s2").unwrap().time_from_treatment_start, 7);

  let none = s
    .cohort_counts(&CohortFilter::new("healthy", "none", "PBMC"))
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn empty_store_reads_are_empty() {
  let s = store().await;
  assert!(s.cell_counts().await.unwrap().is_empty());
  assert!(s.cohort_counts(&CohortFilter::default()).await.unwrap().is_empty());
  assert!(s.baseline_samples(&CohortFilter::default()).await.unwrap().is_empty());
  assert_eq!(s.sample_summary().await.unwrap().samples, 0);
}

// ─── Analyses over the store ─────────────────────────────────────────────────

#[tokio::test]
async fn overview_percentages_sum_to_one_hundred() {
  let s = loaded(ROWS).await;
  let rows = data_overview(&s).await.unwrap();
  assert_eq!(rows.len(), 25);
  let s1: f64 = rows
    .iter()
    .filter(|r| r.sample == "s1")
    .filter_map(|r| r.percentage)
    .sum();
  assert!((s1 - 100.0).abs() < 1e-9);
  assert!(rows.iter().all(|r| r.sample != "s1" || r.total_count == 1000));
}

#[tokio::test]
async fn baseline_summary_over_reference_cohort() {
  let s = loaded(ROWS).await;
  let summary = baseline_summary(&s, &CohortFilter::default()).await.unwrap();
  assert_eq!(summary.total_samples, 2);
  assert_eq!(summary.unique_subjects, 2);
  assert_eq!(summary.samples_by_project["prj1"], 2);
  assert_eq!(summary.subjects_by_response[&Response::Yes], 1);
  assert_eq!(summary.subjects_by_response[&Response::No], 1);
  assert_eq!(summary.subjects_by_sex[&Sex::Male], 1);
  assert_eq!(summary.subjects_by_sex[&Sex::Female], 1);

  let empty = baseline_summary(&s, &CohortFilter::new("x", "y", "z")).await.unwrap();
  assert!(empty.is_empty());
}

#[tokio::test]
async fn comparison_over_reference_cohort() {
  let s = loaded(ROWS).await;
  let comparison = compare(&s, &CohortFilter::default()).await.unwrap();
  assert_eq!(comparison.records.len(), 15);
  assert_eq!(comparison.statistics.len(), 5);
  for stat in &comparison.statistics {
    assert_eq!(stat.n_responders, 2);
    assert_eq!(stat.n_non_responders, 1);
    assert!((0.0..=1.0).contains(&stat.p_value));
  }
  assert_eq!(comparison.plot_points.len(), 15);
}
