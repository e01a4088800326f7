//! Route definitions for the movement ledger and location-pointer tooling.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::movement;
use crate::state::AppState;

/// Movement routes mounted under `/farms/{farm_id}`.
///
/// ```text
/// GET  /farms/{farm_id}/movements                             -> list
/// POST /farms/{farm_id}/animals/{animal_id}/movements         -> record
/// GET  /farms/{farm_id}/animals/{animal_id}/current-lot       -> current_lot
/// POST /farms/{farm_id}/animals/{animal_id}/rebuild-pointer   -> rebuild_pointer
/// GET  /farms/{farm_id}/lots/{lot_id}/animals                 -> lot_animals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farms/{farm_id}/movements", get(movement::list))
        .route(
            "/farms/{farm_id}/lots/{lot_id}/animals",
            get(movement::lot_animals),
        )
        .route(
            "/farms/{farm_id}/animals/{animal_id}/movements",
            post(movement::record),
        )
        .route(
            "/farms/{farm_id}/animals/{animal_id}/current-lot",
            get(movement::current_lot),
        )
        .route(
            "/farms/{farm_id}/animals/{animal_id}/rebuild-pointer",
            post(movement::rebuild_pointer),
        )
}
