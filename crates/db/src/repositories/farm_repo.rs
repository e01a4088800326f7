//! Repository for the `farms` table.
//!
//! Farms are managed by an external module; this subsystem only needs to
//! create them as test/setup scaffolding. Tenant scoping happens through
//! `farm_id` columns on the owned rows, not through farm lookups.

use sqlx::PgPool;

use crate::models::farm::{CreateFarm, Farm};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct FarmRepo;

impl FarmRepo {
    /// Insert a new farm.
    pub async fn create(pool: &PgPool, input: &CreateFarm) -> Result<Farm, sqlx::Error> {
        let query = format!("INSERT INTO farms (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Farm>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}
