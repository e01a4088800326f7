//! Route definitions for the occupancy ledger.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::occupancy;
use crate::state::AppState;

/// Occupancy routes mounted under `/farms/{farm_id}`.
///
/// ```text
/// POST /farms/{farm_id}/occupancies             -> create
/// GET  /farms/{farm_id}/occupancies             -> list_history
/// GET  /farms/{farm_id}/occupancies/active      -> list_active
/// POST /farms/{farm_id}/occupancies/{id}/close  -> close
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/farms/{farm_id}/occupancies",
            post(occupancy::create).get(occupancy::list_history),
        )
        .route(
            "/farms/{farm_id}/occupancies/active",
            get(occupancy::list_active),
        )
        .route(
            "/farms/{farm_id}/occupancies/{id}/close",
            post(occupancy::close),
        )
}
