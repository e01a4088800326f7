//! Movement ledger rules.
//!
//! The movement ledger is append-only and totally ordered per animal by
//! `(moved_at, id)` -- timestamp first, monotonic id as the tiebreaker.
//! The animal's `current_lot_id` pointer is a cache over this order and is
//! re-derived from it, never treated as authoritative.

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Reason codes
// ---------------------------------------------------------------------------

/// Known reason codes for movement events.
///
/// Free-form codes are accepted; these are the ones the rest of the system
/// attaches meaning to.
pub mod reason_codes {
    /// First movement of an animal into the herd (no origin).
    pub const INTAKE: &str = "intake";
    /// Routine rotation between paddocks.
    pub const ROTATION: &str = "rotation";
    /// Moved out for veterinary treatment.
    pub const TREATMENT: &str = "treatment";
    /// Weaning transfer to a new lot.
    pub const WEANING: &str = "weaning";
    /// Sold or otherwise left the farm.
    pub const DISPOSAL: &str = "disposal";
}

// ---------------------------------------------------------------------------
// Ledger ordering
// ---------------------------------------------------------------------------

/// Total-order key for movement rows of one animal.
///
/// `timestamp` orders first; insertion order (monotonic id) breaks ties so
/// "most recent movement" is always deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MovementOrder {
    pub moved_at: Timestamp,
    pub id: DbId,
}

/// Pick the later of two movement keys under the ledger's total order.
pub fn later_of(a: MovementOrder, b: MovementOrder) -> MovementOrder {
    if b > a {
        b
    } else {
        a
    }
}

// ---------------------------------------------------------------------------
// Origin resolution
// ---------------------------------------------------------------------------

/// Effective origin of a movement after applying caller overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveOrigin {
    pub paddock_id: Option<DbId>,
    pub lot_id: Option<DbId>,
}

/// Resolve the origin recorded on a new movement.
///
/// Explicit caller overrides win. Otherwise the origin lot is taken from
/// the animal's current-lot pointer; the origin paddock has no denormalized
/// equivalent and stays `None`. An intake (first movement) naturally
/// resolves to no origin at all.
pub fn resolve_origin(
    override_paddock_id: Option<DbId>,
    override_lot_id: Option<DbId>,
    animal_current_lot_id: Option<DbId>,
) -> EffectiveOrigin {
    EffectiveOrigin {
        paddock_id: override_paddock_id,
        lot_id: override_lot_id.or(animal_current_lot_id),
    }
}
