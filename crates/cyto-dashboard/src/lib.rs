//! Read-only web dashboard over a loaded cytometry store.
//!
//! Exposes an axum [`Router`] with a JSON API and a single HTML page that
//! renders it client-side. Works against any [`CytometryStore`].

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use cyto_core::{cohort::CohortFilter, store::CytometryStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime dashboard configuration, deserialised from `dashboard.toml` and
/// `CYTO_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Default cohort for the comparison and baseline routes.
  pub condition:   String,
  pub treatment:   String,
  pub sample_type: String,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    let cohort = CohortFilter::default();
    Self {
      host:        "127.0.0.1".to_owned(),
      port:        8050,
      store_path:  PathBuf::from("cytometry_data.db"),
      condition:   cohort.condition,
      treatment:   cohort.treatment,
      sample_type: cohort.sample_type,
    }
  }
}

impl DashboardConfig {
  pub fn cohort(&self) -> CohortFilter {
    CohortFilter::new(&self.condition, &self.treatment, &self.sample_type)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<DashboardConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the dashboard [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CytometryStore + 'static,
  S::Error: From<cyto_core::Error>,
{
  Router::new()
    .route("/",                         get(handlers::index::handler))
    .route("/api/summary",              get(handlers::summary::handler::<S>))
    .route("/api/overview",             get(handlers::overview::list::<S>))
    .route("/api/overview.csv",         get(handlers::overview::csv::<S>))
    .route("/api/population-averages",  get(handlers::overview::averages::<S>))
    .route("/api/comparison",           get(handlers::comparison::handler::<S>))
    .route("/api/baseline",             get(handlers::baseline::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cyto_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  const INPUT: &str = "\
project,subject,condition,age,sex,treatment,response,sample,sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte
prj1,sbj1,melanoma,57,M,miraclib,yes,s1,PBMC,0,100,200,300,250,150
prj1,sbj2,melanoma,62,F,miraclib,no,s2,PBMC,0,300,100,100,100,400
prj1,sbj3,melanoma,48,F,miraclib,yes,s3,PBMC,7,120,180,300,250,150
prj2,sbj4,carcinoma,70,M,phauximab,,s4,WB,0,10,20,30,40,50
";

  async fn make_state() -> AppState<SqliteStore> {
    make_state_with(DashboardConfig::default()).await
  }

  async fn make_state_with(config: DashboardConfig) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cell-count.csv");
    std::fs::write(&path, INPUT).unwrap();
    store.load(&path).await.unwrap();

    AppState { store: Arc::new(store), config: Arc::new(config) }
  }

  async fn get_raw(state: AppState<SqliteStore>, uri: &str) -> axum::response::Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn get_json(state: AppState<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let resp = get_raw(state, uri).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn index_serves_html() {
    let resp = get_raw(make_state().await, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
  }

  #[tokio::test]
  async fn index_takes_its_cohort_from_the_server() {
    let resp = get_raw(make_state().await, "/").await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let page = std::str::from_utf8(&bytes).unwrap();
    assert!(page.contains(r#"<input name="condition">"#));
    assert!(!page.contains(r#"value="melanoma""#));
  }

  #[tokio::test]
  async fn summary_counts_distinct_entities() {
    let (status, body) = get_json(make_state().await, "/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projects"], 2);
    assert_eq!(body["subjects"], 4);
    assert_eq!(body["samples"], 4);
    assert_eq!(body["conditions"], 2);
    assert_eq!(body["treatments"], 2);
  }

  #[tokio::test]
  async fn overview_lists_every_pair() {
    let (status, body) = get_json(make_state().await, "/api/overview").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["sample"], "s1");
    assert_eq!(rows[0]["population"], "b_cell");
    assert_eq!(rows[0]["percentage"], 10.0);
  }

  #[tokio::test]
  async fn overview_csv_is_an_attachment() {
    let resp = get_raw(make_state().await, "/api/overview.csv").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.contains("data_overview.csv"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().next(), Some("sample,total_count,population,count,percentage"));
    assert_eq!(text.lines().count(), 21);
  }

  #[tokio::test]
  async fn population_averages_are_sorted() {
    let (status, body) = get_json(make_state().await, "/api/population-averages").await;
    assert_eq!(status, StatusCode::OK);
    let averages = body.as_array().unwrap();
    assert_eq!(averages.len(), 5);
    let values: Vec<f64> = averages
      .iter()
      .map(|a| a["average_percentage"].as_f64().unwrap())
      .collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
    assert!(averages.iter().all(|a| a["display_name"].is_string()));
  }

  #[tokio::test]
  async fn comparison_uses_default_cohort() {
    let (status, body) = get_json(make_state().await, "/api/comparison").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cohort"]["condition"], "melanoma");
    assert_eq!(body["total_samples"], 3);
    assert_eq!(body["responder_samples"], 2);
    assert_eq!(body["non_responder_samples"], 1);
    assert_eq!(body["statistics"].as_array().unwrap().len(), 5);
    assert_eq!(body["plot_points"].as_array().unwrap().len(), 15);
    assert_eq!(body["plot_points"][0]["response"], "Responder");
  }

  #[tokio::test]
  async fn configured_cohort_applies_without_params() {
    let config = DashboardConfig {
      condition: "carcinoma".to_owned(),
      treatment: "phauximab".to_owned(),
      sample_type: "WB".to_owned(),
      ..DashboardConfig::default()
    };
    let state = make_state_with(config).await;

    let (status, body) = get_json(state.clone(), "/api/comparison").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cohort"]["condition"], "carcinoma");
    assert_eq!(body["cohort"]["treatment"], "phauximab");
    assert_eq!(body["cohort"]["sample_type"], "WB");
    assert_eq!(body["total_samples"], 0);

    let (_, body) = get_json(state, "/api/baseline").await;
    assert_eq!(body["cohort"]["condition"], "carcinoma");
    assert_eq!(body["summary"]["total_samples"], 1);
  }

  #[tokio::test]
  async fn comparison_of_unknown_cohort_is_empty() {
    let (status, body) =
      get_json(make_state().await, "/api/comparison?condition=healthy&treatment=none").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cohort"]["condition"], "healthy");
    assert_eq!(body["total_samples"], 0);
    assert!(body["statistics"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn blank_cohort_param_is_a_bad_request() {
    let (status, body) = get_json(make_state().await, "/api/baseline?sample_type=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sample_type"));
  }

  #[tokio::test]
  async fn baseline_summary_for_default_cohort() {
    let (status, body) = get_json(make_state().await, "/api/baseline").await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["summary"];
    assert_eq!(summary["total_samples"], 2);
    assert_eq!(summary["unique_subjects"], 2);
    assert_eq!(summary["samples_by_project"]["prj1"], 2);
    assert_eq!(summary["subjects_by_response"]["yes"], 1);
    assert_eq!(summary["subjects_by_response"]["no"], 1);
    assert_eq!(summary["subjects_by_sex"]["M"], 1);
    assert_eq!(summary["subjects_by_sex"]["F"], 1);
  }

  #[test]
  fn config_defaults_to_reference_cohort() {
    let config = DashboardConfig::default();
    assert_eq!(config.cohort(), CohortFilter::default());
    assert_eq!(config.address(), "127.0.0.1:8050");
  }
}
