//! Occupancy coordinator.
//!
//! Owns the transaction that enforces the exclusivity invariants: at any
//! instant a paddock holds at most one active occupancy and a lot is
//! assigned to at most one paddock (per farm). The check-then-insert runs
//! under row locks, and the partial unique indexes catch the insert/insert
//! race the locks cannot see; both layers surface the same `Conflict`.

use chrono::Utc;
use pastora_core::error::CoreError;
use pastora_core::occupancy::{matches_name_filter, validate_close_range};
use pastora_core::types::DbId;
use pastora_db::models::lot::Lot;
use pastora_db::models::occupancy::{
    ActiveOccupancySummary, CloseOccupancy, CreateOccupancy, Occupancy, OccupancyHistoryQuery,
    OccupancyNamedRow, OccupancyPage, OccupancyView,
};
use pastora_db::models::paddock::Paddock;
use pastora_db::repositories::OccupancyRepo;
use pastora_db::DbPool;

use crate::error::{unique_violation, AppError, AppResult};
use crate::services::tenancy::{resolve_tenant_lot, resolve_tenant_paddock};

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Assign a lot to a paddock, opening a new active occupancy.
///
/// Runs as one transaction: tenant checks, locked exclusivity re-checks,
/// insert. No intermediate state is observable to other transactions.
pub async fn create_occupancy(
    pool: &DbPool,
    farm_id: DbId,
    input: &CreateOccupancy,
) -> AppResult<OccupancyView> {
    let mut tx = pool.begin().await?;

    let paddock = resolve_tenant_paddock(&mut *tx, farm_id, input.paddock_id).await?;
    let lot = resolve_tenant_lot(&mut *tx, farm_id, input.lot_id).await?;

    // Re-check exclusivity inside the transaction, locking any active row
    // so a concurrent close/create on the same paddock or lot serializes.
    if let Some(existing) =
        OccupancyRepo::find_active_by_paddock_for_update(&mut *tx, farm_id, paddock.id).await?
    {
        return Err(paddock_occupied(&paddock, existing.lot_id));
    }

    if let Some(existing) =
        OccupancyRepo::find_active_by_lot_for_update(&mut *tx, farm_id, lot.id).await?
    {
        return Err(lot_assigned(&lot, existing.paddock_id));
    }

    let occupancy = OccupancyRepo::insert(
        &mut *tx,
        farm_id,
        paddock.id,
        lot.id,
        input.start_date,
        input.notes.as_deref(),
    )
    .await
    .map_err(|err| translate_active_unique(err, &paddock, &lot))?;

    tx.commit().await?;

    Ok(view_from_parts(occupancy, &paddock.name, &lot.name))
}

// ---------------------------------------------------------------------------
// Close
// ---------------------------------------------------------------------------

/// Close an active occupancy.
///
/// Closing is pure pasture bookkeeping: it has no effect on the movement
/// ledger or any animal's location pointer. A closed occupancy can never
/// be reopened; a second close is a `Conflict`.
pub async fn close_occupancy(
    pool: &DbPool,
    farm_id: DbId,
    occupancy_id: DbId,
    input: &CloseOccupancy,
) -> AppResult<OccupancyView> {
    let occupancy = OccupancyRepo::find_by_id(pool, farm_id, occupancy_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Occupancy",
            id: occupancy_id,
        }))?;

    validate_close_range(occupancy.start_date, input.end_date).map_err(AppError::Core)?;

    let closed = OccupancyRepo::close(pool, occupancy_id, input.end_date, input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            // The row exists (fetched above) but matched no `end_date IS
            // NULL` guard: it was already closed, possibly by a racing call.
            AppError::Core(CoreError::Conflict(format!(
                "occupancy {occupancy_id} is already closed"
            )))
        })?;

    let named = OccupancyRepo::find_named_by_id(pool, farm_id, closed.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Occupancy",
            id: closed.id,
        }))?;

    Ok(OccupancyView::from_row(named, Utc::now().date_naive()))
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Active occupancies of a farm, projected by paddock and by lot.
///
/// Both projections are the same row set under different sort keys; the
/// optional filter is a case-insensitive substring match on paddock OR lot
/// name.
pub async fn list_active(
    pool: &DbPool,
    farm_id: DbId,
    filter_text: Option<&str>,
) -> AppResult<ActiveOccupancySummary> {
    let today = Utc::now().date_naive();
    let filter = filter_text.unwrap_or("");

    let by_paddock: Vec<OccupancyView> = OccupancyRepo::list_active_named(pool, farm_id)
        .await?
        .into_iter()
        .filter(|row| matches_name_filter(filter, &row.paddock_name, &row.lot_name))
        .map(|row| OccupancyView::from_row(row, today))
        .collect();

    let mut by_lot = by_paddock.clone();
    by_lot.sort_by(|a, b| a.lot_name.cmp(&b.lot_name).then(a.id.cmp(&b.id)));

    Ok(ActiveOccupancySummary { by_paddock, by_lot })
}

/// Paginated occupancy history for a farm.
pub async fn list_history(
    pool: &DbPool,
    farm_id: DbId,
    params: &OccupancyHistoryQuery,
) -> AppResult<OccupancyPage> {
    let today = Utc::now().date_naive();

    let items = OccupancyRepo::query(pool, farm_id, params)
        .await?
        .into_iter()
        .map(|row| OccupancyView::from_row(row, today))
        .collect();
    let total = OccupancyRepo::count(pool, farm_id, params).await?;

    Ok(OccupancyPage { items, total })
}

// ---------------------------------------------------------------------------
// Conflict shaping
// ---------------------------------------------------------------------------

fn paddock_occupied(paddock: &Paddock, by_lot_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "paddock '{}' (id {}) is already occupied by lot {}",
        paddock.name, paddock.id, by_lot_id
    )))
}

fn lot_assigned(lot: &Lot, to_paddock_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "lot '{}' (id {}) is already assigned to paddock {}",
        lot.name, lot.id, to_paddock_id
    )))
}

/// Translate a partial-unique-index rejection at insert time into the same
/// `Conflict` the in-transaction checks produce, so callers see one error
/// shape regardless of which layer caught the race.
fn translate_active_unique(err: sqlx::Error, paddock: &Paddock, lot: &Lot) -> AppError {
    match unique_violation(&err).as_deref() {
        Some("uq_occupancies_active_paddock") => AppError::Core(CoreError::Conflict(format!(
            "paddock '{}' (id {}) is already occupied",
            paddock.name, paddock.id
        ))),
        Some("uq_occupancies_active_lot") => AppError::Core(CoreError::Conflict(format!(
            "lot '{}' (id {}) is already assigned",
            lot.name, lot.id
        ))),
        _ => AppError::Database(err),
    }
}

/// Build the external view from an entity plus the names resolved during
/// the same transaction.
fn view_from_parts(occupancy: Occupancy, paddock_name: &str, lot_name: &str) -> OccupancyView {
    OccupancyView::from_row(
        OccupancyNamedRow {
            id: occupancy.id,
            farm_id: occupancy.farm_id,
            paddock_id: occupancy.paddock_id,
            paddock_name: paddock_name.to_string(),
            lot_id: occupancy.lot_id,
            lot_name: lot_name.to_string(),
            start_date: occupancy.start_date,
            end_date: occupancy.end_date,
            notes: occupancy.notes,
        },
        Utc::now().date_naive(),
    )
}
