//! Occupancy ledger entity models and DTOs.
//!
//! An occupancy is a time-bounded assignment of one lot to one paddock,
//! active while `end_date IS NULL`. Closed rows are immutable except for
//! trailing notes and are never physically deleted (they form the
//! occupancy history).

use pastora_core::occupancy::{days_active, days_occupied};
use pastora_core::types::{DateDay, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Occupancy {
    pub id: DbId,
    pub farm_id: DbId,
    pub paddock_id: DbId,
    pub lot_id: DbId,
    pub start_date: DateDay,
    pub end_date: Option<DateDay>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Occupancy {
    /// An occupancy is active while its end date is unset.
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

// ---------------------------------------------------------------------------
// Write DTOs
// ---------------------------------------------------------------------------

/// DTO for assigning a lot to a paddock.
///
/// `farm_id` is overridden from the URL path by the handler.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOccupancy {
    #[serde(default)]
    pub farm_id: DbId,
    pub paddock_id: DbId,
    pub lot_id: DbId,
    pub start_date: DateDay,
    pub notes: Option<String>,
}

/// DTO for closing an occupancy. Notes are replaced only when provided.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseOccupancy {
    pub end_date: DateDay,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Read-side projections
// ---------------------------------------------------------------------------

/// One occupancy row joined with its paddock and lot names.
#[derive(Debug, Clone, FromRow)]
pub struct OccupancyNamedRow {
    pub id: DbId,
    pub farm_id: DbId,
    pub paddock_id: DbId,
    pub paddock_name: String,
    pub lot_id: DbId,
    pub lot_name: String,
    pub start_date: DateDay,
    pub end_date: Option<DateDay>,
    pub notes: Option<String>,
}

/// External-facing occupancy projection with a computed day count.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyView {
    pub id: DbId,
    pub farm_id: DbId,
    pub paddock_id: DbId,
    pub paddock_name: String,
    pub lot_id: DbId,
    pub lot_name: String,
    pub start_date: DateDay,
    pub end_date: Option<DateDay>,
    /// Whole calendar days: start to today while active, start to end once
    /// closed. Calendar-day truncation, never wall-clock elapsed time.
    pub days: i64,
    pub notes: Option<String>,
}

impl OccupancyView {
    /// Project a joined row, computing the day count against `today`.
    pub fn from_row(row: OccupancyNamedRow, today: DateDay) -> Self {
        let days = match row.end_date {
            Some(end) => days_occupied(row.start_date, end),
            None => days_active(row.start_date, today),
        };
        Self {
            id: row.id,
            farm_id: row.farm_id,
            paddock_id: row.paddock_id,
            paddock_name: row.paddock_name,
            lot_id: row.lot_id,
            lot_name: row.lot_name,
            start_date: row.start_date,
            end_date: row.end_date,
            days,
            notes: row.notes,
        }
    }
}

/// Active occupancies for a farm, projected twice over the same row set:
/// once sorted by paddock name, once by lot name.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveOccupancySummary {
    pub by_paddock: Vec<OccupancyView>,
    pub by_lot: Vec<OccupancyView>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for the occupancy history query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyHistoryQuery {
    pub paddock_id: Option<DbId>,
    pub lot_id: Option<DbId>,
    /// Restrict to active rows only.
    #[serde(default)]
    pub active_only: bool,
    /// Inclusive lower bound on `start_date`.
    pub from: Option<DateDay>,
    /// Inclusive upper bound on `start_date`.
    pub to: Option<DateDay>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated occupancy history response.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyPage {
    pub items: Vec<OccupancyView>,
    pub total: i64,
}
