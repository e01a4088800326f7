//! Movement ledger entity models and DTOs.
//!
//! Movements are append-only: created once, never updated or deleted. The
//! repository layer exposes no update path for this table. Per-animal
//! ordering is `(moved_at, id)`.

use pastora_core::movement::MovementOrder;
use pastora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A single movement event. Immutable once created (no `updated_at`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movement {
    pub id: DbId,
    pub farm_id: DbId,
    pub animal_id: DbId,
    pub moved_at: Timestamp,
    pub origin_paddock_id: Option<DbId>,
    pub destination_paddock_id: Option<DbId>,
    pub origin_lot_id: Option<DbId>,
    pub destination_lot_id: Option<DbId>,
    pub reason_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl Movement {
    /// This row's position in the per-animal total order.
    pub fn order_key(&self) -> MovementOrder {
        MovementOrder {
            moved_at: self.moved_at,
            id: self.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Write DTO
// ---------------------------------------------------------------------------

/// DTO for recording a movement.
///
/// `farm_id` and `animal_id` are overridden from the URL path by the
/// handler. Origin fields are optional overrides: when absent, the origin
/// lot is derived from the animal's current-lot pointer and the origin
/// paddock is left null (the first movement is commonly an intake with no
/// origin at all).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovement {
    #[serde(default)]
    pub farm_id: DbId,
    #[serde(default)]
    pub animal_id: DbId,
    pub moved_at: Timestamp,
    pub origin_paddock_id: Option<DbId>,
    pub origin_lot_id: Option<DbId>,
    pub destination_paddock_id: Option<DbId>,
    pub destination_lot_id: Option<DbId>,
    pub reason_code: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for querying the movement ledger.
///
/// `paddock_id`/`lot_id` match origin OR destination membership.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementQuery {
    pub animal_id: Option<DbId>,
    pub paddock_id: Option<DbId>,
    pub lot_id: Option<DbId>,
    /// Inclusive lower bound on `moved_at`.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on `moved_at`.
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated movement ledger response, ordered `moved_at DESC, id DESC`.
#[derive(Debug, Clone, Serialize)]
pub struct MovementPage {
    pub items: Vec<Movement>,
    pub total: i64,
}
