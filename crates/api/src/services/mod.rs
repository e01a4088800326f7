//! Coordinator services.
//!
//! The transactional boundary between the HTTP layer and the repositories.
//! The occupancy and movement coordinators are the only code paths allowed
//! to write the occupancy ledger's active rows and the animals'
//! `current_lot_id` pointer.

pub mod movement;
pub mod occupancy;
pub mod tenancy;
