//! Handlers for the movement ledger and the animal location pointer.
//!
//! Movements and animal location tooling are nested under farms:
//! `/farms/{farm_id}/movements`, `/farms/{farm_id}/animals/{animal_id}/...`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pastora_core::types::DbId;
use pastora_db::models::animal::{Animal, AnimalLocation};
use pastora_db::models::movement::{CreateMovement, Movement, MovementPage, MovementQuery};

use crate::error::AppResult;
use crate::services;
use crate::state::AppState;

/// POST /api/v1/farms/{farm_id}/animals/{animal_id}/movements
///
/// Overrides `input.farm_id` and `input.animal_id` from the URL path.
pub async fn record(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<CreateMovement>,
) -> AppResult<(StatusCode, Json<Movement>)> {
    input.farm_id = farm_id;
    input.animal_id = animal_id;
    let movement = services::movement::record_movement(&state.pool, farm_id, &input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// GET /api/v1/farms/{farm_id}/movements
pub async fn list(
    State(state): State<AppState>,
    Path(farm_id): Path<DbId>,
    Query(params): Query<MovementQuery>,
) -> AppResult<Json<MovementPage>> {
    let page = services::movement::list_movements(&state.pool, farm_id, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/farms/{farm_id}/animals/{animal_id}/current-lot
pub async fn current_lot(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<AnimalLocation>> {
    let location = services::movement::current_lot_of(&state.pool, farm_id, animal_id).await?;
    Ok(Json(location))
}

/// GET /api/v1/farms/{farm_id}/lots/{lot_id}/animals
pub async fn lot_animals(
    State(state): State<AppState>,
    Path((farm_id, lot_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Vec<Animal>>> {
    let animals = services::movement::animals_in_lot(&state.pool, farm_id, lot_id).await?;
    Ok(Json(animals))
}

/// POST /api/v1/farms/{farm_id}/animals/{animal_id}/rebuild-pointer
pub async fn rebuild_pointer(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<AnimalLocation>> {
    let location = services::movement::rebuild_pointer(&state.pool, farm_id, animal_id).await?;
    Ok(Json(location))
}
