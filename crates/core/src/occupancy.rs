//! Occupancy ledger rules.
//!
//! Pure functions for the paddock/lot occupancy ledger: day-count
//! computation for active occupancies, close-date validation, and the
//! name filter used by the active-state summary. Storage-side enforcement
//! (row locks, partial unique indexes) lives in the repository layer.

use crate::error::CoreError;
use crate::types::DateDay;

// ---------------------------------------------------------------------------
// Day counting
// ---------------------------------------------------------------------------

/// Number of whole calendar days an occupancy has been active.
///
/// Both dates are calendar dates (already normalized to midnight), so this
/// is `floor((today - start_date) / 1 day)` by construction -- never
/// wall-clock elapsed time. A same-day occupancy yields 0. Returns 0 for a
/// `start_date` in the future rather than a negative count.
pub fn days_active(start_date: DateDay, today: DateDay) -> i64 {
    (today - start_date).num_days().max(0)
}

/// Number of whole calendar days a closed occupancy lasted.
pub fn days_occupied(start_date: DateDay, end_date: DateDay) -> i64 {
    (end_date - start_date).num_days().max(0)
}

// ---------------------------------------------------------------------------
// Close validation
// ---------------------------------------------------------------------------

/// Validate the date range of a close operation.
///
/// An occupancy may be closed on its start date (a same-day assignment that
/// was immediately reversed), but never before it.
pub fn validate_close_range(start_date: DateDay, end_date: DateDay) -> Result<(), CoreError> {
    if end_date < start_date {
        return Err(CoreError::Validation(format!(
            "end_date {end_date} is before start_date {start_date}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Name filtering
// ---------------------------------------------------------------------------

/// Case-insensitive substring match used by the active-occupancy summary.
///
/// An empty or whitespace-only filter matches everything. The summary
/// applies this to the paddock name OR the lot name of each row.
pub fn matches_name_filter(filter: &str, paddock_name: &str, lot_name: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    paddock_name.to_lowercase().contains(&needle) || lot_name.to_lowercase().contains(&needle)
}
