//! Integration tests for the movement ledger repository.
//!
//! Exercises `MovementRepo` against a real database:
//! - append + latest-row lookup under the `(moved_at, id)` order
//! - current-lot derivation from the ledger
//! - ledger query filters (animal, paddock/lot membership, time range)
//!   and pagination counts

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;

use pastora_core::movement::{later_of, reason_codes};
use pastora_db::models::animal::CreateAnimal;
use pastora_db::models::farm::CreateFarm;
use pastora_db::models::lot::CreateLot;
use pastora_db::models::movement::{CreateMovement, MovementQuery};
use pastora_db::models::paddock::CreatePaddock;
use pastora_db::repositories::{AnimalRepo, FarmRepo, LotRepo, MovementRepo, PaddockRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

struct Fixture {
    farm: i64,
    paddock_a: i64,
    paddock_b: i64,
    lot_a: i64,
    lot_b: i64,
    animal: i64,
}

async fn setup(pool: &PgPool, suffix: &str) -> Fixture {
    let farm = FarmRepo::create(
        pool,
        &CreateFarm {
            name: format!("Farm_{suffix}"),
        },
    )
    .await
    .unwrap()
    .id;
    let paddock_a = PaddockRepo::create(
        pool,
        &CreatePaddock {
            farm_id: farm,
            name: "Alpha".to_string(),
            area_hectares: None,
        },
    )
    .await
    .unwrap()
    .id;
    let paddock_b = PaddockRepo::create(
        pool,
        &CreatePaddock {
            farm_id: farm,
            name: "Bravo".to_string(),
            area_hectares: None,
        },
    )
    .await
    .unwrap()
    .id;
    let lot_a = LotRepo::create(
        pool,
        &CreateLot {
            farm_id: farm,
            name: "Heifers".to_string(),
            active: None,
        },
    )
    .await
    .unwrap()
    .id;
    let lot_b = LotRepo::create(
        pool,
        &CreateLot {
            farm_id: farm,
            name: "Steers".to_string(),
            active: None,
        },
    )
    .await
    .unwrap()
    .id;
    let animal = AnimalRepo::create(
        pool,
        &CreateAnimal {
            farm_id: farm,
            tag: format!("TAG_{suffix}"),
        },
    )
    .await
    .unwrap()
    .id;

    Fixture {
        farm,
        paddock_a,
        paddock_b,
        lot_a,
        lot_b,
        animal,
    }
}

fn movement(fx: &Fixture, moved_at: DateTime<Utc>) -> CreateMovement {
    CreateMovement {
        farm_id: fx.farm,
        animal_id: fx.animal,
        moved_at,
        origin_paddock_id: None,
        origin_lot_id: None,
        destination_paddock_id: None,
        destination_lot_id: None,
        reason_code: None,
        notes: None,
    }
}

async fn append(pool: &PgPool, input: &CreateMovement) -> pastora_db::models::movement::Movement {
    let mut conn = pool.acquire().await.unwrap();
    MovementRepo::insert(&mut conn, input).await.unwrap()
}

// ---------------------------------------------------------------------------
// Ledger order and derivation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn derive_is_none_without_movements(pool: PgPool) {
    let fx = setup(&pool, "empty").await;

    let derived = MovementRepo::derive_current_lot_pool(&pool, fx.animal)
        .await
        .unwrap();
    assert_eq!(derived, None);

    let latest = MovementRepo::find_latest_for_animal(&pool, fx.animal)
        .await
        .unwrap();
    assert!(latest.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn latest_row_follows_timestamp_then_id(pool: PgPool) {
    let fx = setup(&pool, "order").await;

    // Two rows with the same timestamp: insertion order breaks the tie.
    let first = append(
        &pool,
        &CreateMovement {
            destination_lot_id: Some(fx.lot_a),
            ..movement(&fx, ts(10))
        },
    )
    .await;
    let second = append(
        &pool,
        &CreateMovement {
            destination_lot_id: Some(fx.lot_b),
            ..movement(&fx, ts(10))
        },
    )
    .await;
    assert!(second.id > first.id);

    let latest = MovementRepo::find_latest_for_animal(&pool, fx.animal)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(
        latest.order_key(),
        later_of(first.order_key(), second.order_key())
    );
    assert_eq!(
        MovementRepo::derive_current_lot_pool(&pool, fx.animal)
            .await
            .unwrap(),
        Some(fx.lot_b)
    );

    // An earlier-timestamped row appended later does not become latest.
    append(
        &pool,
        &CreateMovement {
            destination_lot_id: Some(fx.lot_a),
            ..movement(&fx, ts(5))
        },
    )
    .await;
    assert_eq!(
        MovementRepo::derive_current_lot_pool(&pool, fx.animal)
            .await
            .unwrap(),
        Some(fx.lot_b)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn derive_reflects_null_destination(pool: PgPool) {
    let fx = setup(&pool, "null_dest").await;

    append(
        &pool,
        &CreateMovement {
            destination_lot_id: Some(fx.lot_a),
            ..movement(&fx, ts(10))
        },
    )
    .await;
    // A later movement with no destination lot (e.g. a disposal).
    append(&pool, &movement(&fx, ts(20))).await;

    assert_eq!(
        MovementRepo::derive_current_lot_pool(&pool, fx.animal)
            .await
            .unwrap(),
        None
    );
}

// ---------------------------------------------------------------------------
// Ledger queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn query_orders_newest_first_and_counts(pool: PgPool) {
    let fx = setup(&pool, "q").await;

    let m1 = append(&pool, &movement(&fx, ts(10))).await;
    let m2 = append(&pool, &movement(&fx, ts(30))).await;
    let m3 = append(&pool, &movement(&fx, ts(20))).await;

    let rows = MovementRepo::query(&pool, fx.farm, &MovementQuery::default())
        .await
        .unwrap();
    assert_eq!(
        rows.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![m2.id, m3.id, m1.id]
    );
    assert_eq!(
        MovementRepo::count(&pool, fx.farm, &MovementQuery::default())
            .await
            .unwrap(),
        3
    );

    let params = MovementQuery {
        limit: Some(2),
        offset: Some(1),
        ..Default::default()
    };
    let page = MovementRepo::query(&pool, fx.farm, &params).await.unwrap();
    assert_eq!(
        page.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![m3.id, m1.id]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn paddock_and_lot_filters_match_origin_or_destination(pool: PgPool) {
    let fx = setup(&pool, "filters").await;

    // Intake into paddock A / lot A.
    append(
        &pool,
        &CreateMovement {
            destination_paddock_id: Some(fx.paddock_a),
            destination_lot_id: Some(fx.lot_a),
            reason_code: Some(reason_codes::INTAKE.to_string()),
            ..movement(&fx, ts(10))
        },
    )
    .await;
    // Transfer A -> B.
    append(
        &pool,
        &CreateMovement {
            origin_paddock_id: Some(fx.paddock_a),
            origin_lot_id: Some(fx.lot_a),
            destination_paddock_id: Some(fx.paddock_b),
            destination_lot_id: Some(fx.lot_b),
            reason_code: Some(reason_codes::ROTATION.to_string()),
            ..movement(&fx, ts(20))
        },
    )
    .await;

    // Paddock A appears as destination of the intake and origin of the
    // transfer: both rows match.
    let params = MovementQuery {
        paddock_id: Some(fx.paddock_a),
        ..Default::default()
    };
    assert_eq!(MovementRepo::count(&pool, fx.farm, &params).await.unwrap(), 2);

    // Paddock B only appears once.
    let params = MovementQuery {
        paddock_id: Some(fx.paddock_b),
        ..Default::default()
    };
    assert_eq!(MovementRepo::count(&pool, fx.farm, &params).await.unwrap(), 1);

    // Lot membership behaves the same way.
    let params = MovementQuery {
        lot_id: Some(fx.lot_b),
        ..Default::default()
    };
    assert_eq!(MovementRepo::count(&pool, fx.farm, &params).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn time_range_and_animal_filters(pool: PgPool) {
    let fx = setup(&pool, "range").await;
    let other = AnimalRepo::create(
        &pool,
        &CreateAnimal {
            farm_id: fx.farm,
            tag: "OTHER".to_string(),
        },
    )
    .await
    .unwrap();

    append(&pool, &movement(&fx, ts(10))).await;
    append(&pool, &movement(&fx, ts(20))).await;
    append(
        &pool,
        &CreateMovement {
            animal_id: other.id,
            ..movement(&fx, ts(30))
        },
    )
    .await;

    let params = MovementQuery {
        animal_id: Some(fx.animal),
        ..Default::default()
    };
    assert_eq!(MovementRepo::count(&pool, fx.farm, &params).await.unwrap(), 2);

    let params = MovementQuery {
        from: Some(ts(15)),
        to: Some(ts(30)),
        ..Default::default()
    };
    assert_eq!(MovementRepo::count(&pool, fx.farm, &params).await.unwrap(), 2);
}
