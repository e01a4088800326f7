//! Integration tests for the occupancy ledger repository.
//!
//! Exercises `OccupancyRepo` against a real database:
//! - insert / close lifecycle and the `end_date IS NULL` close guard
//! - partial unique indexes rejecting a second active row per paddock/lot
//! - active listing joined with names
//! - history query filters, ordering, and pagination counts

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;

use pastora_db::models::farm::CreateFarm;
use pastora_db::models::lot::CreateLot;
use pastora_db::models::occupancy::OccupancyHistoryQuery;
use pastora_db::models::paddock::CreatePaddock;
use pastora_db::repositories::{FarmRepo, LotRepo, OccupancyRepo, PaddockRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn setup_farm(pool: &PgPool, suffix: &str) -> i64 {
    FarmRepo::create(
        pool,
        &CreateFarm {
            name: format!("Farm_{suffix}"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_paddock(pool: &PgPool, farm_id: i64, name: &str) -> i64 {
    PaddockRepo::create(
        pool,
        &CreatePaddock {
            farm_id,
            name: name.to_string(),
            area_hectares: Some(4.5),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_lot(pool: &PgPool, farm_id: i64, name: &str) -> i64 {
    LotRepo::create(
        pool,
        &CreateLot {
            farm_id,
            name: name.to_string(),
            active: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn insert_occupancy(
    pool: &PgPool,
    farm_id: i64,
    paddock_id: i64,
    lot_id: i64,
    start: NaiveDate,
) -> Result<pastora_db::models::occupancy::Occupancy, sqlx::Error> {
    let mut conn = pool.acquire().await.unwrap();
    OccupancyRepo::insert(&mut conn, farm_id, paddock_id, lot_id, start, None).await
}

/// Extract the violated constraint name from a database error.
fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.constraint().map(str::to_string),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn insert_creates_active_occupancy(pool: PgPool) {
    let farm = setup_farm(&pool, "ins").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    let occ = insert_occupancy(&pool, farm, paddock, lot, date(2024, 1, 1))
        .await
        .unwrap();

    assert!(occ.is_active());
    assert_eq!(occ.start_date, date(2024, 1, 1));
    assert_eq!(occ.end_date, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn close_sets_end_date_and_guards_double_close(pool: PgPool) {
    let farm = setup_farm(&pool, "close").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    let occ = insert_occupancy(&pool, farm, paddock, lot, date(2024, 1, 1))
        .await
        .unwrap();

    let closed = OccupancyRepo::close(&pool, occ.id, date(2024, 3, 1), Some("rotated out"))
        .await
        .unwrap()
        .expect("first close should match the active row");
    assert_eq!(closed.end_date, Some(date(2024, 3, 1)));
    assert_eq!(closed.notes.as_deref(), Some("rotated out"));

    // The `end_date IS NULL` guard makes the second close a no-op.
    let again = OccupancyRepo::close(&pool, occ.id, date(2024, 4, 1), None)
        .await
        .unwrap();
    assert!(again.is_none());

    // Closed row is otherwise untouched.
    let found = OccupancyRepo::find_by_id(&pool, farm, occ.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.start_date, date(2024, 1, 1));
    assert_eq!(found.end_date, Some(date(2024, 3, 1)));
}

#[sqlx::test(migrations = "./migrations")]
async fn close_without_notes_preserves_existing_notes(pool: PgPool) {
    let farm = setup_farm(&pool, "notes").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    let mut conn = pool.acquire().await.unwrap();
    let occ = OccupancyRepo::insert(
        &mut conn,
        farm,
        paddock,
        lot,
        date(2024, 1, 1),
        Some("spring grazing"),
    )
    .await
    .unwrap();
    drop(conn);

    let closed = OccupancyRepo::close(&pool, occ.id, date(2024, 2, 1), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.notes.as_deref(), Some("spring grazing"));
}

// ---------------------------------------------------------------------------
// Exclusivity (storage-level line of defense)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn second_active_row_per_paddock_is_rejected(pool: PgPool) {
    let farm = setup_farm(&pool, "uqp").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot_a = new_lot(&pool, farm, "Heifers").await;
    let lot_b = new_lot(&pool, farm, "Steers").await;

    insert_occupancy(&pool, farm, paddock, lot_a, date(2024, 1, 1))
        .await
        .unwrap();

    let err = insert_occupancy(&pool, farm, paddock, lot_b, date(2024, 1, 2))
        .await
        .unwrap_err();
    assert_eq!(
        constraint_of(&err).as_deref(),
        Some("uq_occupancies_active_paddock")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn second_active_row_per_lot_is_rejected(pool: PgPool) {
    let farm = setup_farm(&pool, "uql").await;
    let paddock_a = new_paddock(&pool, farm, "North").await;
    let paddock_b = new_paddock(&pool, farm, "South").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    insert_occupancy(&pool, farm, paddock_a, lot, date(2024, 1, 1))
        .await
        .unwrap();

    let err = insert_occupancy(&pool, farm, paddock_b, lot, date(2024, 1, 2))
        .await
        .unwrap_err();
    assert_eq!(
        constraint_of(&err).as_deref(),
        Some("uq_occupancies_active_lot")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn closed_row_frees_paddock_and_lot(pool: PgPool) {
    let farm = setup_farm(&pool, "free").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot_a = new_lot(&pool, farm, "Heifers").await;
    let lot_b = new_lot(&pool, farm, "Steers").await;

    let occ = insert_occupancy(&pool, farm, paddock, lot_a, date(2024, 1, 1))
        .await
        .unwrap();
    OccupancyRepo::close(&pool, occ.id, date(2024, 3, 1), None)
        .await
        .unwrap()
        .unwrap();

    // The partial index only covers active rows, so the paddock is free.
    let reopened = insert_occupancy(&pool, farm, paddock, lot_b, date(2024, 3, 2)).await;
    assert_matches!(reopened, Ok(_));
}

#[sqlx::test(migrations = "./migrations")]
async fn for_update_lookup_finds_only_active_rows(pool: PgPool) {
    let farm = setup_farm(&pool, "lock").await;
    let paddock = new_paddock(&pool, farm, "North").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    let occ = insert_occupancy(&pool, farm, paddock, lot, date(2024, 1, 1))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let active = OccupancyRepo::find_active_by_paddock_for_update(&mut tx, farm, paddock)
        .await
        .unwrap();
    assert_eq!(active.map(|o| o.id), Some(occ.id));
    tx.commit().await.unwrap();

    OccupancyRepo::close(&pool, occ.id, date(2024, 2, 1), None)
        .await
        .unwrap()
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let active = OccupancyRepo::find_active_by_lot_for_update(&mut tx, farm, lot)
        .await
        .unwrap();
    assert!(active.is_none());
    tx.rollback().await.unwrap();
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn active_listing_joins_names_and_skips_closed(pool: PgPool) {
    let farm = setup_farm(&pool, "list").await;
    let paddock_a = new_paddock(&pool, farm, "Alpha").await;
    let paddock_b = new_paddock(&pool, farm, "Bravo").await;
    let lot_a = new_lot(&pool, farm, "Heifers").await;
    let lot_b = new_lot(&pool, farm, "Steers").await;

    let closed = insert_occupancy(&pool, farm, paddock_a, lot_a, date(2024, 1, 1))
        .await
        .unwrap();
    OccupancyRepo::close(&pool, closed.id, date(2024, 1, 15), None)
        .await
        .unwrap()
        .unwrap();

    insert_occupancy(&pool, farm, paddock_a, lot_a, date(2024, 2, 1))
        .await
        .unwrap();
    insert_occupancy(&pool, farm, paddock_b, lot_b, date(2024, 2, 2))
        .await
        .unwrap();

    let rows = OccupancyRepo::list_active_named(&pool, farm).await.unwrap();
    assert_eq!(rows.len(), 2);
    // Ordered by paddock name.
    assert_eq!(rows[0].paddock_name, "Alpha");
    assert_eq!(rows[0].lot_name, "Heifers");
    assert_eq!(rows[1].paddock_name, "Bravo");
    assert_eq!(rows[1].lot_name, "Steers");
}

#[sqlx::test(migrations = "./migrations")]
async fn history_query_filters_and_counts(pool: PgPool) {
    let farm = setup_farm(&pool, "hist").await;
    let paddock_a = new_paddock(&pool, farm, "Alpha").await;
    let paddock_b = new_paddock(&pool, farm, "Bravo").await;
    let lot = new_lot(&pool, farm, "Heifers").await;

    // Three sequential occupancies of the same lot across two paddocks.
    let o1 = insert_occupancy(&pool, farm, paddock_a, lot, date(2024, 1, 1))
        .await
        .unwrap();
    OccupancyRepo::close(&pool, o1.id, date(2024, 2, 1), None)
        .await
        .unwrap()
        .unwrap();
    let o2 = insert_occupancy(&pool, farm, paddock_b, lot, date(2024, 2, 2))
        .await
        .unwrap();
    OccupancyRepo::close(&pool, o2.id, date(2024, 3, 1), None)
        .await
        .unwrap()
        .unwrap();
    insert_occupancy(&pool, farm, paddock_a, lot, date(2024, 3, 2))
        .await
        .unwrap();

    // Unfiltered: all three, newest start first.
    let all = OccupancyRepo::query(&pool, farm, &OccupancyHistoryQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].start_date, date(2024, 3, 2));
    assert_eq!(all[2].start_date, date(2024, 1, 1));

    // Filter by paddock.
    let params = OccupancyHistoryQuery {
        paddock_id: Some(paddock_a),
        ..Default::default()
    };
    assert_eq!(OccupancyRepo::query(&pool, farm, &params).await.unwrap().len(), 2);
    assert_eq!(OccupancyRepo::count(&pool, farm, &params).await.unwrap(), 2);

    // Active only.
    let params = OccupancyHistoryQuery {
        active_only: true,
        ..Default::default()
    };
    let active = OccupancyRepo::query(&pool, farm, &params).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].start_date, date(2024, 3, 2));

    // Date range on start_date.
    let params = OccupancyHistoryQuery {
        from: Some(date(2024, 2, 1)),
        to: Some(date(2024, 2, 28)),
        ..Default::default()
    };
    assert_eq!(OccupancyRepo::count(&pool, farm, &params).await.unwrap(), 1);

    // Pagination.
    let params = OccupancyHistoryQuery {
        limit: Some(2),
        offset: Some(2),
        ..Default::default()
    };
    let page = OccupancyRepo::query(&pool, farm, &params).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].start_date, date(2024, 1, 1));
}

#[sqlx::test(migrations = "./migrations")]
async fn history_is_scoped_to_the_farm(pool: PgPool) {
    let farm_a = setup_farm(&pool, "scope_a").await;
    let farm_b = setup_farm(&pool, "scope_b").await;
    let paddock = new_paddock(&pool, farm_a, "North").await;
    let lot = new_lot(&pool, farm_a, "Heifers").await;

    insert_occupancy(&pool, farm_a, paddock, lot, date(2024, 1, 1))
        .await
        .unwrap();

    let other = OccupancyRepo::query(&pool, farm_b, &OccupancyHistoryQuery::default())
        .await
        .unwrap();
    assert!(other.is_empty());
}
