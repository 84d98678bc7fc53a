//! Handlers over the full data overview.

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use cyto_core::{
  analysis::{OverviewRow, data_overview, population_averages},
  population::Population,
  store::CytometryStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

/// `GET /api/overview`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<OverviewRow>>, ApiError>
where
  S: CytometryStore,
{
  let rows = data_overview(state.store.as_ref()).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

/// `GET /api/overview.csv`, served as a `data_overview.csv` download.
pub async fn csv<S>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, ApiError>
where
  S: CytometryStore,
{
  let rows = data_overview(state.store.as_ref()).await.map_err(ApiError::store)?;
  let body = cyto_tabular::overview_to_string(&rows).map_err(ApiError::store)?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"data_overview.csv\""),
    ],
    body,
  ))
}

#[derive(Debug, Serialize)]
pub struct AverageView {
  pub population:         Population,
  pub display_name:       &'static str,
  pub average_percentage: f64,
  pub samples:            usize,
}

/// `GET /api/population-averages`, highest average first.
pub async fn averages<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<AverageView>>, ApiError>
where
  S: CytometryStore,
{
  let rows = data_overview(state.store.as_ref()).await.map_err(ApiError::store)?;
  let averages = population_averages(&rows)
    .into_iter()
    .map(|a| AverageView {
      population:         a.population,
      display_name:       a.population.display_name(),
      average_percentage: a.average_percentage,
      samples:            a.samples,
    })
    .collect();
  Ok(Json(averages))
}
