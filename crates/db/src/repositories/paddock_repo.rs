//! Repository for the `paddocks` table.

use pastora_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::paddock::{CreatePaddock, Paddock};

const COLUMNS: &str = "id, farm_id, name, area_hectares, created_at, updated_at";

pub struct PaddockRepo;

impl PaddockRepo {
    /// Insert a new paddock.
    pub async fn create(pool: &PgPool, input: &CreatePaddock) -> Result<Paddock, sqlx::Error> {
        let query = format!(
            "INSERT INTO paddocks (farm_id, name, area_hectares)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Paddock>(&query)
            .bind(input.farm_id)
            .bind(&input.name)
            .bind(input.area_hectares)
            .fetch_one(pool)
            .await
    }

    /// Find a paddock by its internal ID, regardless of farm.
    ///
    /// Tenant scoping is the coordinator's responsibility: it distinguishes
    /// "does not exist" from "exists under another farm".
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Paddock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM paddocks WHERE id = $1");
        sqlx::query_as::<_, Paddock>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
