//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — access to the engine's persisted aggregates
//! - `DomainResult` — standard result type for domain operations

use super::chargeability_cache::ChargeabilityCacheRepository;
use super::vehicle::FleetVehicleRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to the persisted aggregates.
///
/// ```ignore
/// async fn run(repos: &dyn RepositoryProvider, owner: Uuid) {
///     let fleet = repos.fleet_vehicles().find_by_owner(owner).await?;
///     let ids: Vec<_> = fleet.iter().map(|v| v.id).collect();
///     let rows = repos.chargeability_cache().find_for_vehicles(&ids).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn fleet_vehicles(&self) -> &dyn FleetVehicleRepository;
    fn chargeability_cache(&self) -> &dyn ChargeabilityCacheRepository;
}
