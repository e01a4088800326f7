//! Handlers for the occupancy ledger.
//!
//! Occupancies are nested under farms:
//! `/farms/{farm_id}/occupancies[...]`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pastora_core::types::DbId;
use pastora_db::models::occupancy::{
    ActiveOccupancySummary, CloseOccupancy, CreateOccupancy, OccupancyHistoryQuery, OccupancyPage,
    OccupancyView,
};

use crate::error::AppResult;
use crate::query::ActiveFilterParams;
use crate::services;
use crate::state::AppState;

/// POST /api/v1/farms/{farm_id}/occupancies
///
/// Overrides `input.farm_id` with the value from the URL path.
pub async fn create(
    State(state): State<AppState>,
    Path(farm_id): Path<DbId>,
    Json(mut input): Json<CreateOccupancy>,
) -> AppResult<(StatusCode, Json<OccupancyView>)> {
    input.farm_id = farm_id;
    let view = services::occupancy::create_occupancy(&state.pool, farm_id, &input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/v1/farms/{farm_id}/occupancies/{id}/close
pub async fn close(
    State(state): State<AppState>,
    Path((farm_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<CloseOccupancy>,
) -> AppResult<Json<OccupancyView>> {
    let view = services::occupancy::close_occupancy(&state.pool, farm_id, id, &input).await?;
    Ok(Json(view))
}

/// GET /api/v1/farms/{farm_id}/occupancies/active
pub async fn list_active(
    State(state): State<AppState>,
    Path(farm_id): Path<DbId>,
    Query(params): Query<ActiveFilterParams>,
) -> AppResult<Json<ActiveOccupancySummary>> {
    let summary =
        services::occupancy::list_active(&state.pool, farm_id, params.filter.as_deref()).await?;
    Ok(Json(summary))
}

/// GET /api/v1/farms/{farm_id}/occupancies
pub async fn list_history(
    State(state): State<AppState>,
    Path(farm_id): Path<DbId>,
    Query(params): Query<OccupancyHistoryQuery>,
) -> AppResult<Json<OccupancyPage>> {
    let page = services::occupancy::list_history(&state.pool, farm_id, &params).await?;
    Ok(Json(page))
}
