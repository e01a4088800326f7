//! Repository for the `occupancies` table.
//!
//! Rows in this table form the occupancy ledger: never physically deleted,
//! closed by setting `end_date`. The active-row exclusivity invariants are
//! enforced twice -- by the coordinator's in-transaction `FOR UPDATE`
//! checks here, and by the partial unique indexes
//! `uq_occupancies_active_paddock` / `uq_occupancies_active_lot` at commit.

use pastora_core::types::{DateDay, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::occupancy::{Occupancy, OccupancyHistoryQuery, OccupancyNamedRow};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `occupancies` SELECT queries.
const COLUMNS: &str = "\
    id, farm_id, paddock_id, lot_id, start_date, end_date, notes, \
    created_at, updated_at";

/// Column list for queries joined with paddock/lot names.
const NAMED_COLUMNS: &str = "\
    o.id, o.farm_id, o.paddock_id, p.name AS paddock_name, \
    o.lot_id, l.name AS lot_name, o.start_date, o.end_date, o.notes";

const NAMED_FROM: &str = "\
    occupancies o \
    JOIN paddocks p ON p.id = o.paddock_id \
    JOIN lots l ON l.id = o.lot_id";

// ---------------------------------------------------------------------------
// OccupancyRepo
// ---------------------------------------------------------------------------

pub struct OccupancyRepo;

impl OccupancyRepo {
    // -- Coordinator steps (caller owns the transaction) -----------------

    /// Find the active occupancy of a paddock and lock it for the rest of
    /// the transaction.
    pub async fn find_active_by_paddock_for_update(
        conn: &mut PgConnection,
        farm_id: DbId,
        paddock_id: DbId,
    ) -> Result<Option<Occupancy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM occupancies
             WHERE farm_id = $1 AND paddock_id = $2 AND end_date IS NULL
             FOR UPDATE"
        );
        sqlx::query_as::<_, Occupancy>(&query)
            .bind(farm_id)
            .bind(paddock_id)
            .fetch_optional(conn)
            .await
    }

    /// Find the active occupancy of a lot and lock it for the rest of the
    /// transaction.
    pub async fn find_active_by_lot_for_update(
        conn: &mut PgConnection,
        farm_id: DbId,
        lot_id: DbId,
    ) -> Result<Option<Occupancy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM occupancies
             WHERE farm_id = $1 AND lot_id = $2 AND end_date IS NULL
             FOR UPDATE"
        );
        sqlx::query_as::<_, Occupancy>(&query)
            .bind(farm_id)
            .bind(lot_id)
            .fetch_optional(conn)
            .await
    }

    /// Insert a new active occupancy (`end_date` NULL).
    ///
    /// An insert/insert race that slipped past the `FOR UPDATE` checks
    /// (row locks cannot guard a row that does not exist yet) surfaces here
    /// as a 23505 on one of the `uq_occupancies_active_*` indexes; the
    /// coordinator translates that into the same `Conflict` the checks
    /// produce.
    pub async fn insert(
        conn: &mut PgConnection,
        farm_id: DbId,
        paddock_id: DbId,
        lot_id: DbId,
        start_date: DateDay,
        notes: Option<&str>,
    ) -> Result<Occupancy, sqlx::Error> {
        let query = format!(
            "INSERT INTO occupancies (farm_id, paddock_id, lot_id, start_date, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Occupancy>(&query)
            .bind(farm_id)
            .bind(paddock_id)
            .bind(lot_id)
            .bind(start_date)
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    // -- Plain queries ---------------------------------------------------

    /// Find an occupancy by its internal ID, scoped to a farm.
    pub async fn find_by_id(
        pool: &PgPool,
        farm_id: DbId,
        id: DbId,
    ) -> Result<Option<Occupancy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM occupancies WHERE id = $1 AND farm_id = $2");
        sqlx::query_as::<_, Occupancy>(&query)
            .bind(id)
            .bind(farm_id)
            .fetch_optional(pool)
            .await
    }

    /// Close an occupancy: set `end_date`, replace notes only when provided.
    ///
    /// The `end_date IS NULL` guard makes double-close race-safe -- the
    /// second caller matches no row and gets `None`. Closed rows are
    /// otherwise immutable; there is no reopen path.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        end_date: DateDay,
        notes: Option<&str>,
    ) -> Result<Option<Occupancy>, sqlx::Error> {
        let query = format!(
            "UPDATE occupancies SET
                end_date = $2,
                notes = COALESCE($3, notes),
                updated_at = NOW()
             WHERE id = $1 AND end_date IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Occupancy>(&query)
            .bind(id)
            .bind(end_date)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Find an occupancy joined with its paddock and lot names.
    pub async fn find_named_by_id(
        pool: &PgPool,
        farm_id: DbId,
        id: DbId,
    ) -> Result<Option<OccupancyNamedRow>, sqlx::Error> {
        let query = format!(
            "SELECT {NAMED_COLUMNS} FROM {NAMED_FROM}
             WHERE o.id = $1 AND o.farm_id = $2"
        );
        sqlx::query_as::<_, OccupancyNamedRow>(&query)
            .bind(id)
            .bind(farm_id)
            .fetch_optional(pool)
            .await
    }

    /// List all active occupancies of a farm joined with paddock and lot
    /// names, ordered by paddock name.
    pub async fn list_active_named(
        pool: &PgPool,
        farm_id: DbId,
    ) -> Result<Vec<OccupancyNamedRow>, sqlx::Error> {
        let query = format!(
            "SELECT {NAMED_COLUMNS} FROM {NAMED_FROM}
             WHERE o.farm_id = $1 AND o.end_date IS NULL
             ORDER BY p.name, o.id"
        );
        sqlx::query_as::<_, OccupancyNamedRow>(&query)
            .bind(farm_id)
            .fetch_all(pool)
            .await
    }

    /// Query occupancy history with filtering and pagination, ordered by
    /// `start_date DESC, id DESC`.
    pub async fn query(
        pool: &PgPool,
        farm_id: DbId,
        params: &OccupancyHistoryQuery,
    ) -> Result<Vec<OccupancyNamedRow>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_history_filter(farm_id, params);

        let query = format!(
            "SELECT {NAMED_COLUMNS} FROM {NAMED_FROM} {where_clause} \
             ORDER BY o.start_date DESC, o.id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_history_values(sqlx::query_as::<_, OccupancyNamedRow>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count occupancy history rows matching the filter (for pagination
    /// metadata).
    pub async fn count(
        pool: &PgPool,
        farm_id: DbId,
        params: &OccupancyHistoryQuery,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_history_filter(farm_id, params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM {NAMED_FROM} {where_clause}");

        let q = bind_history_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built history queries.
enum BindValue {
    BigInt(DbId),
    Date(DateDay),
}

/// Build a WHERE clause and bind values from history filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_history_filter(
    farm_id: DbId,
    params: &OccupancyHistoryQuery,
) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = vec!["o.farm_id = $1".to_string()];
    let mut bind_idx = 2u32;
    let mut bind_values: Vec<BindValue> = vec![BindValue::BigInt(farm_id)];

    if let Some(paddock_id) = params.paddock_id {
        conditions.push(format!("o.paddock_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(paddock_id));
    }

    if let Some(lot_id) = params.lot_id {
        conditions.push(format!("o.lot_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(lot_id));
    }

    if params.active_only {
        conditions.push("o.end_date IS NULL".to_string());
    }

    if let Some(from) = params.from {
        conditions.push(format!("o.start_date >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("o.start_date <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(to));
    }

    (format!("WHERE {}", conditions.join(" AND ")), bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_history_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_history_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}
