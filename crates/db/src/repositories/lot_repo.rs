//! Repository for the `lots` table.

use pastora_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::lot::{CreateLot, Lot};

const COLUMNS: &str = "id, farm_id, name, active, created_at, updated_at";

pub struct LotRepo;

impl LotRepo {
    /// Insert a new lot. `active` defaults to true.
    pub async fn create(pool: &PgPool, input: &CreateLot) -> Result<Lot, sqlx::Error> {
        let query = format!(
            "INSERT INTO lots (farm_id, name, active)
             VALUES ($1, $2, COALESCE($3, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lot>(&query)
            .bind(input.farm_id)
            .bind(&input.name)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a lot by its internal ID, regardless of farm.
    ///
    /// Tenant scoping is the coordinator's responsibility: it distinguishes
    /// "does not exist" from "exists under another farm".
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Lot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lots WHERE id = $1");
        sqlx::query_as::<_, Lot>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
