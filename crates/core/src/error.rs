use crate::types::DbId;

/// Domain error taxonomy shared by all layers.
///
/// Every public operation recovers storage failures at its boundary and
/// returns one of these variants; callers never see raw driver errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced entity does not exist or is not visible to the tenant.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Referenced paddock or lot belongs to a different farm. A cross-farm
    /// reference is a distinct failure, not merely a not-found.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// An exclusivity or state invariant would be violated (paddock already
    /// occupied, lot already assigned, occupancy already closed).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input (end date before start date, missing identifiers).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unexpected storage failure. Safe for the caller to retry the whole
    /// operation; never retried inside the core.
    #[error("Internal error: {0}")]
    Internal(String),
}
