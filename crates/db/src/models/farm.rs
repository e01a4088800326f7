//! Farm entity -- the tenancy anchor.
//!
//! Farm management (creation, settings, deletion) is an external module;
//! this subsystem only needs the row as a scoping precondition, so the
//! model and its DTO stay minimal.

use pastora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Farm {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a farm (test/setup scaffolding only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFarm {
    pub name: String,
}
