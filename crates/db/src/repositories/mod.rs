//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Steps that must run inside the
//! coordinator transactions (exclusivity checks, ledger insert + pointer
//! write) take `&mut PgConnection` instead so the caller owns the
//! transaction boundary.

pub mod animal_repo;
pub mod farm_repo;
pub mod lot_repo;
pub mod movement_repo;
pub mod occupancy_repo;
pub mod paddock_repo;

pub use animal_repo::AnimalRepo;
pub use farm_repo::FarmRepo;
pub use lot_repo::LotRepo;
pub use movement_repo::MovementRepo;
pub use occupancy_repo::OccupancyRepo;
pub use paddock_repo::PaddockRepo;
