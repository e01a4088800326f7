//! Pastora domain core.
//!
//! Pure domain logic for the paddock/lot occupancy and animal-location
//! subsystem. This crate has no database or HTTP dependencies so the same
//! rules can be used by the API, repositories, and any future CLI tooling.

pub mod error;
pub mod movement;
pub mod occupancy;
pub mod types;
