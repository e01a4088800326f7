//! Repository for the `animals` table.
//!
//! The only writer of `current_lot_id` is the movement coordinator; no
//! other code path may touch that column.

use pastora_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::animal::{Animal, CreateAnimal};

const COLUMNS: &str = "id, farm_id, tag, current_lot_id, created_at, updated_at";

pub struct AnimalRepo;

impl AnimalRepo {
    /// Insert a new animal with no current lot (intake happens through the
    /// movement ledger, not at creation).
    pub async fn create(pool: &PgPool, input: &CreateAnimal) -> Result<Animal, sqlx::Error> {
        let query = format!(
            "INSERT INTO animals (farm_id, tag) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Animal>(&query)
            .bind(input.farm_id)
            .bind(&input.tag)
            .fetch_one(pool)
            .await
    }

    /// Find an animal by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Animal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM animals WHERE id = $1");
        sqlx::query_as::<_, Animal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an animal by ID and take a row lock for the remainder of the
    /// transaction. Serializes concurrent movement writes per animal.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Animal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM animals WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Animal>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Write the denormalized current-lot pointer.
    ///
    /// Must only be called from the movement coordinator, inside the same
    /// transaction as the ledger insert it reflects.
    pub async fn set_current_lot(
        conn: &mut PgConnection,
        id: DbId,
        current_lot_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE animals SET current_lot_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(current_lot_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// List animals currently pointing at the given lot, ordered by tag.
    pub async fn list_by_current_lot(
        pool: &PgPool,
        lot_id: DbId,
    ) -> Result<Vec<Animal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM animals WHERE current_lot_id = $1 ORDER BY tag");
        sqlx::query_as::<_, Animal>(&query)
            .bind(lot_id)
            .fetch_all(pool)
            .await
    }
}
