//! Tenant boundary checks.
//!
//! Every coordinator operation is already scoped to one farm; these
//! resolvers confirm a referenced row actually sits inside that boundary
//! before any write proceeds. For paddocks and lots a row under a different
//! farm is the distinct `InvalidReference` failure; an animal of another
//! tenant must not be observable at all, so it stays plain `NotFound`.

use pastora_core::error::CoreError;
use pastora_core::types::DbId;
use pastora_db::models::animal::Animal;
use pastora_db::models::lot::Lot;
use pastora_db::models::paddock::Paddock;
use pastora_db::repositories::{AnimalRepo, LotRepo, PaddockRepo};
use pastora_db::DbPool;
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};

/// Resolve a paddock within the tenant boundary.
pub async fn resolve_tenant_paddock(
    conn: &mut PgConnection,
    farm_id: DbId,
    paddock_id: DbId,
) -> AppResult<Paddock> {
    let paddock = PaddockRepo::find_by_id(conn, paddock_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Paddock",
            id: paddock_id,
        }))?;
    if paddock.farm_id != farm_id {
        return Err(AppError::Core(CoreError::InvalidReference(format!(
            "paddock {paddock_id} does not belong to farm {farm_id}"
        ))));
    }
    Ok(paddock)
}

/// Resolve a lot within the tenant boundary.
pub async fn resolve_tenant_lot(
    conn: &mut PgConnection,
    farm_id: DbId,
    lot_id: DbId,
) -> AppResult<Lot> {
    let lot = LotRepo::find_by_id(conn, lot_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lot",
            id: lot_id,
        }))?;
    if lot.farm_id != farm_id {
        return Err(AppError::Core(CoreError::InvalidReference(format!(
            "lot {lot_id} does not belong to farm {farm_id}"
        ))));
    }
    Ok(lot)
}

/// Resolve an animal within the tenant boundary.
pub async fn resolve_tenant_animal(
    pool: &DbPool,
    farm_id: DbId,
    animal_id: DbId,
) -> AppResult<Animal> {
    let animal = AnimalRepo::find_by_id(pool, animal_id).await?;
    tenant_animal(animal, farm_id, animal_id)
}

/// Locked variant for the write paths: takes the animal's row lock, which
/// serializes per-animal movement writes for the rest of the transaction.
pub async fn resolve_tenant_animal_for_update(
    conn: &mut PgConnection,
    farm_id: DbId,
    animal_id: DbId,
) -> AppResult<Animal> {
    let animal = AnimalRepo::find_by_id_for_update(conn, animal_id).await?;
    tenant_animal(animal, farm_id, animal_id)
}

fn tenant_animal(animal: Option<Animal>, farm_id: DbId, animal_id: DbId) -> AppResult<Animal> {
    match animal {
        Some(a) if a.farm_id == farm_id => Ok(a),
        _ => Err(AppError::Core(CoreError::NotFound {
            entity: "Animal",
            id: animal_id,
        })),
    }
}
