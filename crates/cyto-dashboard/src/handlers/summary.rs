use axum::{Json, extract::State};
use cyto_core::store::{CytometryStore, StoreSummary};

use crate::{AppState, error::ApiError};

/// `GET /api/summary`
pub async fn handler<S>(State(state): State<AppState<S>>) -> Result<Json<StoreSummary>, ApiError>
where
  S: CytometryStore,
{
  let summary = state.store.sample_summary().await.map_err(ApiError::store)?;
  Ok(Json(summary))
}
