//! Repository for the `movements` table.
//!
//! The movement ledger is append-only: this repository exposes insert and
//! read operations only. There is no update or delete path for this table
//! by design.

use pastora_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::movement::{CreateMovement, Movement, MovementQuery};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, farm_id, animal_id, moved_at, origin_paddock_id, destination_paddock_id, \
    origin_lot_id, destination_lot_id, reason_code, notes, created_at";

// ---------------------------------------------------------------------------
// MovementRepo
// ---------------------------------------------------------------------------

pub struct MovementRepo;

impl MovementRepo {
    // -- Coordinator steps (caller owns the transaction) -----------------

    /// Append a movement to the ledger.
    ///
    /// `input` must already carry the effective origin (overrides applied,
    /// or derived from the animal's pointer by the coordinator).
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateMovement,
    ) -> Result<Movement, sqlx::Error> {
        let query = format!(
            "INSERT INTO movements
                (farm_id, animal_id, moved_at, origin_paddock_id, destination_paddock_id,
                 origin_lot_id, destination_lot_id, reason_code, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movement>(&query)
            .bind(input.farm_id)
            .bind(input.animal_id)
            .bind(input.moved_at)
            .bind(input.origin_paddock_id)
            .bind(input.destination_paddock_id)
            .bind(input.origin_lot_id)
            .bind(input.destination_lot_id)
            .bind(&input.reason_code)
            .bind(&input.notes)
            .fetch_one(conn)
            .await
    }

    /// Re-derive the animal's current lot from the ledger inside an open
    /// transaction: the `destination_lot_id` of the latest movement by
    /// `(moved_at, id)`, or `None` with no movements.
    pub async fn derive_current_lot(
        conn: &mut PgConnection,
        animal_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DbId>>(
            "SELECT destination_lot_id FROM movements
             WHERE animal_id = $1
             ORDER BY moved_at DESC, id DESC
             LIMIT 1",
        )
        .bind(animal_id)
        .fetch_optional(conn)
        .await
        .map(|opt| opt.flatten())
    }

    // -- Plain queries ---------------------------------------------------

    /// Pool-based variant of [`derive_current_lot`] for the audit query
    /// path (no transaction required for a single read).
    ///
    /// [`derive_current_lot`]: MovementRepo::derive_current_lot
    pub async fn derive_current_lot_pool(
        pool: &PgPool,
        animal_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DbId>>(
            "SELECT destination_lot_id FROM movements
             WHERE animal_id = $1
             ORDER BY moved_at DESC, id DESC
             LIMIT 1",
        )
        .bind(animal_id)
        .fetch_optional(pool)
        .await
        .map(|opt| opt.flatten())
    }

    /// The most recent movement of an animal under the ledger order.
    pub async fn find_latest_for_animal(
        pool: &PgPool,
        animal_id: DbId,
    ) -> Result<Option<Movement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM movements
             WHERE animal_id = $1
             ORDER BY moved_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Movement>(&query)
            .bind(animal_id)
            .fetch_optional(pool)
            .await
    }

    /// Query the movement ledger with filtering and pagination, ordered by
    /// `moved_at DESC, id DESC`.
    pub async fn query(
        pool: &PgPool,
        farm_id: DbId,
        params: &MovementQuery,
    ) -> Result<Vec<Movement>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_movement_filter(farm_id, params);

        let query = format!(
            "SELECT {COLUMNS} FROM movements {where_clause} \
             ORDER BY moved_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_movement_values(sqlx::query_as::<_, Movement>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count ledger rows matching the filter (for pagination metadata).
    pub async fn count(
        pool: &PgPool,
        farm_id: DbId,
        params: &MovementQuery,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_movement_filter(farm_id, params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM movements {where_clause}");

        let q = bind_movement_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built ledger queries.
enum BindValue {
    BigInt(DbId),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from ledger filter parameters.
///
/// `paddock_id`/`lot_id` match origin OR destination membership.
fn build_movement_filter(farm_id: DbId, params: &MovementQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = vec!["farm_id = $1".to_string()];
    let mut bind_idx = 2u32;
    let mut bind_values: Vec<BindValue> = vec![BindValue::BigInt(farm_id)];

    if let Some(animal_id) = params.animal_id {
        conditions.push(format!("animal_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(animal_id));
    }

    if let Some(paddock_id) = params.paddock_id {
        conditions.push(format!(
            "(origin_paddock_id = ${bind_idx} OR destination_paddock_id = ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(paddock_id));
    }

    if let Some(lot_id) = params.lot_id {
        conditions.push(format!(
            "(origin_lot_id = ${bind_idx} OR destination_lot_id = ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(lot_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("moved_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("moved_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    (format!("WHERE {}", conditions.join(" AND ")), bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_movement_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_movement_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
