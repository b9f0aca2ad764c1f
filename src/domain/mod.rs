//! Domain layer: entities, value types and repository contracts.

pub mod chargeability_cache;
pub mod clean_air_zone;
pub mod compliance;
pub mod exemption;
pub mod repositories;
pub mod vehicle;

pub use chargeability_cache::{CachePopulationOutcome, ChargeabilityCacheEntry, ChargeabilityCacheRepository};
pub use clean_air_zone::{CleanAirZone, TariffClass};
pub use compliance::{BulkComplianceResults, ComplianceOutcome, ComplianceResults, UnresolvedVrn};
pub use exemption::{ExemptionSource, ExemptionVerdict};
pub use repositories::{DomainResult, RepositoryProvider};
pub use vehicle::{FleetVehicle, FleetVehicleRepository, Vehicle, VehicleType, Wheelchair};

pub use crate::shared::errors::DomainError;
