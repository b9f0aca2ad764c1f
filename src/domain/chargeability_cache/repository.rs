//! Chargeability cache repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::ChargeabilityCacheEntry;
use crate::domain::DomainResult;

#[async_trait]
pub trait ChargeabilityCacheRepository: Send + Sync {
    async fn find_for_vehicles(&self, vehicle_ids: &[Uuid]) -> DomainResult<Vec<ChargeabilityCacheEntry>>;

    /// Vehicle ids having at least one row refreshed before `cutoff`.
    async fn find_stale_vehicle_ids(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Uuid>>;

    /// Insert or overwrite all rows in one transaction. Either every row is
    /// written or none is.
    async fn upsert_all(&self, entries: Vec<ChargeabilityCacheEntry>) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
