//! Lot entity models.
//!
//! A lot is a managed group of animals owned by a farm.

use pastora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lot {
    pub id: DbId,
    pub farm_id: DbId,
    pub name: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a lot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLot {
    pub farm_id: DbId,
    pub name: String,
    pub active: Option<bool>,
}
