//! Application ports (hexagonal architecture boundaries)

pub mod cached;
pub mod outbound;

pub use cached::{CachedVehicleDetails, CachedZoneCatalog};
pub use outbound::{RegistryPort, VehicleDetailsProvider, ZoneCatalog};
