//! Entity models and DTOs for the occupancy/movement subsystem.

pub mod animal;
pub mod farm;
pub mod lot;
pub mod movement;
pub mod occupancy;
pub mod paddock;
