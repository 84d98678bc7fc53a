use axum::{
  Json,
  extract::{Query, State},
};
use cyto_core::{
  analysis::{PlotPoint, PopulationStatistics, compare},
  cohort::CohortFilter,
  store::CytometryStore,
  subject::Response,
};
use serde::Serialize;

use crate::{AppState, error::ApiError, handlers::CohortParams};

/// Statistics and box-plot points for one cohort. Non-finite statistics
/// serialise as `null`.
#[derive(Debug, Serialize)]
pub struct ComparisonView {
  pub cohort:                CohortFilter,
  pub total_samples:         usize,
  pub responder_samples:     usize,
  pub non_responder_samples: usize,
  pub statistics:            Vec<PopulationStatistics>,
  pub plot_points:           Vec<PlotPoint>,
}

/// `GET /api/comparison[?condition=..&treatment=..&sample_type=..]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CohortParams>,
) -> Result<Json<ComparisonView>, ApiError>
where
  S: CytometryStore,
  S::Error: From<cyto_core::Error>,
{
  let cohort = params.resolve(&state.config.cohort())?;
  let comparison = compare(state.store.as_ref(), &cohort).await.map_err(ApiError::store)?;

  Ok(Json(ComparisonView {
    total_samples: comparison.sample_count(None),
    responder_samples: comparison.sample_count(Some(Response::Yes)),
    non_responder_samples: comparison.sample_count(Some(Response::No)),
    statistics: comparison.statistics,
    plot_points: comparison.plot_points,
    cohort,
  }))
}
