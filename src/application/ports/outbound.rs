//! Outbound ports: external registries and reference data the engine reads
//!
//! Each port offers a single-VRN and a bulk call. Implementations report
//! "no record" as `Ok(None)` (or by omitting the VRN from a bulk answer);
//! [`LookupError::NotFound`] is accepted too and treated the same way.

use async_trait::async_trait;

use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::exemption::RegistryRecord;
use crate::domain::vehicle::Vehicle;
use crate::shared::errors::LookupError;

/// A VRN-keyed registry (MOD, general whitelist, retrofit, taxi register).
#[async_trait]
pub trait RegistryPort<R: RegistryRecord>: Send + Sync {
    async fn find(&self, vrn: &str) -> Result<Option<R>, LookupError>;

    /// Records for whichever of `vrns` the registry knows.
    async fn find_many(&self, vrns: &[String]) -> Result<Vec<R>, LookupError>;
}

/// Vehicle attributes from the national vehicle register.
#[async_trait]
pub trait VehicleDetailsProvider: Send + Sync {
    async fn find(&self, vrn: &str) -> Result<Option<Vehicle>, LookupError>;

    /// Details for whichever of `vrns` are known; missing VRNs are simply absent.
    async fn find_many(&self, vrns: &[String]) -> Result<Vec<Vehicle>, LookupError>;
}

/// Source of Clean Air Zone definitions.
#[async_trait]
pub trait ZoneCatalog: Send + Sync {
    async fn zones(&self) -> Result<Vec<CleanAirZone>, LookupError>;
}
