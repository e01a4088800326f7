//! Movement coordinator.
//!
//! Owns the transaction that appends to the movement ledger and maintains
//! the animals' `current_lot_id` pointer. The two writes commit together or
//! not at all; no reader ever observes the ledger and the pointer out of
//! step. The pointer is re-derived from the ledger's latest row rather than
//! overwritten, so racing movements with out-of-order timestamps converge
//! on the `(moved_at, id)`-latest destination.

use pastora_core::movement::resolve_origin;
use pastora_core::types::DbId;
use pastora_db::models::animal::{Animal, AnimalLocation};
use pastora_db::models::movement::{CreateMovement, Movement, MovementPage, MovementQuery};
use pastora_db::repositories::{AnimalRepo, MovementRepo};
use pastora_db::DbPool;

use crate::error::AppResult;
use crate::services::tenancy::{
    resolve_tenant_animal, resolve_tenant_animal_for_update, resolve_tenant_lot,
    resolve_tenant_paddock,
};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Append a movement and update the animal's location pointer atomically.
///
/// The animal row is locked first, which serializes concurrent movement
/// writes for the same animal. Note this deliberately does NOT touch the
/// occupancy ledger: the two ledgers are independent (see DESIGN.md).
pub async fn record_movement(
    pool: &DbPool,
    farm_id: DbId,
    input: &CreateMovement,
) -> AppResult<Movement> {
    let mut tx = pool.begin().await?;

    let animal = resolve_tenant_animal_for_update(&mut *tx, farm_id, input.animal_id).await?;

    // Any supplied paddock/lot reference must exist and belong to the farm.
    // The ledger does not require a reachable prior paddock -- the first
    // movement is commonly an intake with no origin at all.
    for paddock_id in [input.origin_paddock_id, input.destination_paddock_id]
        .into_iter()
        .flatten()
    {
        resolve_tenant_paddock(&mut *tx, farm_id, paddock_id).await?;
    }
    for lot_id in [input.origin_lot_id, input.destination_lot_id]
        .into_iter()
        .flatten()
    {
        resolve_tenant_lot(&mut *tx, farm_id, lot_id).await?;
    }

    let origin = resolve_origin(
        input.origin_paddock_id,
        input.origin_lot_id,
        animal.current_lot_id,
    );

    let movement = MovementRepo::insert(
        &mut *tx,
        &CreateMovement {
            farm_id,
            animal_id: animal.id,
            moved_at: input.moved_at,
            origin_paddock_id: origin.paddock_id,
            origin_lot_id: origin.lot_id,
            destination_paddock_id: input.destination_paddock_id,
            destination_lot_id: input.destination_lot_id,
            reason_code: input.reason_code.clone(),
            notes: input.notes.clone(),
        },
    )
    .await?;

    // Re-derive instead of writing input.destination_lot_id directly: if a
    // later-timestamped movement already committed, its destination wins.
    let derived = MovementRepo::derive_current_lot(&mut *tx, animal.id).await?;
    AnimalRepo::set_current_lot(&mut *tx, animal.id, derived).await?;

    tx.commit().await?;

    Ok(movement)
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Paginated movement history for a farm.
pub async fn list_movements(
    pool: &DbPool,
    farm_id: DbId,
    params: &MovementQuery,
) -> AppResult<MovementPage> {
    let items = MovementRepo::query(pool, farm_id, params).await?;
    let total = MovementRepo::count(pool, farm_id, params).await?;
    Ok(MovementPage { items, total })
}

/// Audit an animal's location pointer against the ledger.
///
/// `derived_lot_id` is the pure re-derivation ("true" current lot); the
/// stored pointer is reported alongside so repair tooling can spot
/// divergence without trusting the cache.
pub async fn current_lot_of(
    pool: &DbPool,
    farm_id: DbId,
    animal_id: DbId,
) -> AppResult<AnimalLocation> {
    let animal = resolve_tenant_animal(pool, farm_id, animal_id).await?;
    let derived = MovementRepo::derive_current_lot_pool(pool, animal.id).await?;

    Ok(AnimalLocation {
        animal_id: animal.id,
        consistent: animal.current_lot_id == derived,
        current_lot_id: animal.current_lot_id,
        derived_lot_id: derived,
    })
}

/// Animals currently located in a lot, per their location pointers.
///
/// This is the membership query the denormalized pointer exists for; it
/// reads the pointer, not the ledger.
pub async fn animals_in_lot(pool: &DbPool, farm_id: DbId, lot_id: DbId) -> AppResult<Vec<Animal>> {
    let mut conn = pool.acquire().await?;
    let lot = resolve_tenant_lot(&mut conn, farm_id, lot_id).await?;
    drop(conn);

    Ok(AnimalRepo::list_by_current_lot(pool, lot.id).await?)
}

/// Rebuild the location pointer from the ledger. Idempotent repair path.
pub async fn rebuild_pointer(
    pool: &DbPool,
    farm_id: DbId,
    animal_id: DbId,
) -> AppResult<AnimalLocation> {
    let mut tx = pool.begin().await?;

    let animal = resolve_tenant_animal_for_update(&mut *tx, farm_id, animal_id).await?;
    let derived = MovementRepo::derive_current_lot(&mut *tx, animal.id).await?;
    AnimalRepo::set_current_lot(&mut *tx, animal.id, derived).await?;

    tx.commit().await?;

    Ok(AnimalLocation {
        animal_id: animal.id,
        current_lot_id: derived,
        derived_lot_id: derived,
        consistent: true,
    })
}

