//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for the active-occupancy summary
/// (`?filter=` -- case-insensitive substring over paddock/lot names).
#[derive(Debug, Default, Deserialize)]
pub struct ActiveFilterParams {
    pub filter: Option<String>,
}
