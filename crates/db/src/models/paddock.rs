//! Paddock entity models.
//!
//! A paddock is a fenced grazing area owned by a farm. It carries no
//! occupancy state of its own; whether it is occupied is derived from the
//! occupancy ledger.

use pastora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Paddock {
    pub id: DbId,
    pub farm_id: DbId,
    pub name: String,
    pub area_hectares: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a paddock.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaddock {
    pub farm_id: DbId,
    pub name: String,
    pub area_hectares: Option<f64>,
}
