use axum::{
  Json,
  extract::{Query, State},
};
use cyto_core::{
  analysis::{BaselineSummary, baseline_summary},
  cohort::CohortFilter,
  store::CytometryStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError, handlers::CohortParams};

#[derive(Debug, Serialize)]
pub struct BaselineView {
  pub cohort:  CohortFilter,
  pub summary: BaselineSummary,
}

/// `GET /api/baseline[?condition=..&treatment=..&sample_type=..]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CohortParams>,
) -> Result<Json<BaselineView>, ApiError>
where
  S: CytometryStore,
{
  let cohort = params.resolve(&state.config.cohort())?;
  let summary = baseline_summary(state.store.as_ref(), &cohort)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(BaselineView { cohort, summary }))
}
