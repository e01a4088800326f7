//! HTTP handlers. Thin adapters over the coordinator services.

pub mod movement;
pub mod occupancy;
