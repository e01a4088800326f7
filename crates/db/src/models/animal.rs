//! Animal entity models.
//!
//! `current_lot_id` is a denormalized pointer over the movement ledger --
//! never independently authoritative. It is written only inside the
//! movement transaction and can always be re-derived from the ledger.

use pastora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Animal {
    pub id: DbId,
    pub farm_id: DbId,
    pub tag: String,
    pub current_lot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an animal (intake happens via the movement ledger,
/// so a fresh animal starts with no current lot).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnimal {
    pub farm_id: DbId,
    pub tag: String,
}

/// Audit/repair report for one animal's location pointer.
///
/// `derived_lot_id` is recomputed from the movement ledger; `consistent`
/// is false whenever the stored pointer has diverged from it (a bug, or a
/// pointer awaiting rebuild).
#[derive(Debug, Clone, Serialize)]
pub struct AnimalLocation {
    pub animal_id: DbId,
    pub current_lot_id: Option<DbId>,
    pub derived_lot_id: Option<DbId>,
    pub consistent: bool,
}
