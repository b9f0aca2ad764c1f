//! Storage implementations

mod memory;

pub use memory::{
    InMemoryChargeabilityCache, InMemoryFleetVehicleRepository, InMemoryPorts, InMemoryRegistry,
    InMemoryStorage, InMemoryVehicleDetails, InMemoryZoneCatalog,
};
