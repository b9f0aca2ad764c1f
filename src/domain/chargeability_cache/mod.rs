//! Chargeability cache aggregate

pub mod model;
pub mod repository;

pub use model::{CachePopulationOutcome, ChargeabilityCacheEntry};
pub use repository::ChargeabilityCacheRepository;
