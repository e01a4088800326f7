//! Route tree for the occupancy/movement subsystem.

pub mod health;
pub mod movement;
pub mod occupancy;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy (every route is scoped to one farm -- the tenant
/// boundary precondition):
///
/// ```text
/// /farms/{farm_id}/occupancies                          create, history
/// /farms/{farm_id}/occupancies/active                   active summary
/// /farms/{farm_id}/occupancies/{id}/close               close (POST)
///
/// /farms/{farm_id}/movements                            ledger query
/// /farms/{farm_id}/animals/{animal_id}/movements        record (POST)
/// /farms/{farm_id}/animals/{animal_id}/current-lot      pointer audit
/// /farms/{farm_id}/animals/{animal_id}/rebuild-pointer  pointer repair (POST)
/// /farms/{farm_id}/lots/{lot_id}/animals                lot membership
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(occupancy::router())
        .merge(movement::router())
}
