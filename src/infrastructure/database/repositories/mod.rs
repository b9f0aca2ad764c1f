//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod chargeability_cache_repository;
pub mod fleet_vehicle_repository;
pub mod repository_provider;

pub use repository_provider::SeaOrmRepositoryProvider;

use uuid::Uuid;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Validation(format!("Database error: {}", e))
}

pub(crate) fn parse_id(field: &str, value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Validation(format!("Corrupt {} '{}': {}", field, value, e)))
}
