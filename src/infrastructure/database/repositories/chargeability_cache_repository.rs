//! SeaORM implementation of ChargeabilityCacheRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ChargeabilityCacheEntry, ChargeabilityCacheRepository, DomainError, DomainResult};
use crate::infrastructure::database::entities::vehicle_chargeability;

use super::{db_err, parse_id};

fn to_pence(charge: Decimal) -> DomainResult<i64> {
    (charge * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| DomainError::Validation(format!("Charge out of range: {}", charge)))
}

fn entity_to_domain(m: vehicle_chargeability::Model) -> DomainResult<ChargeabilityCacheEntry> {
    Ok(ChargeabilityCacheEntry {
        vehicle_id: parse_id("vehicle_chargeability.vehicle_id", &m.vehicle_id)?,
        zone_id: parse_id("vehicle_chargeability.zone_id", &m.zone_id)?,
        charge: m.charge_pence.map(|p| Decimal::new(p, 2)),
        is_exempt: m.is_exempt,
        is_retrofitted: m.is_retrofitted,
        tariff_code: m.tariff_code,
        refreshed_at: m.refreshed_at,
    })
}

fn domain_to_active(e: ChargeabilityCacheEntry) -> DomainResult<vehicle_chargeability::ActiveModel> {
    Ok(vehicle_chargeability::ActiveModel {
        vehicle_id: Set(e.vehicle_id.to_string()),
        zone_id: Set(e.zone_id.to_string()),
        charge_pence: Set(e.charge.map(to_pence).transpose()?),
        is_exempt: Set(e.is_exempt),
        is_retrofitted: Set(e.is_retrofitted),
        tariff_code: Set(e.tariff_code),
        refreshed_at: Set(e.refreshed_at),
    })
}

pub struct SeaOrmChargeabilityCacheRepository {
    db: DatabaseConnection,
}

impl SeaOrmChargeabilityCacheRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChargeabilityCacheRepository for SeaOrmChargeabilityCacheRepository {
    async fn find_for_vehicles(&self, vehicle_ids: &[Uuid]) -> DomainResult<Vec<ChargeabilityCacheEntry>> {
        if vehicle_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = vehicle_ids.iter().map(Uuid::to_string).collect();
        let models = vehicle_chargeability::Entity::find()
            .filter(vehicle_chargeability::Column::VehicleId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn find_stale_vehicle_ids(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Uuid>> {
        let ids: Vec<String> = vehicle_chargeability::Entity::find()
            .select_only()
            .column(vehicle_chargeability::Column::VehicleId)
            .distinct()
            .filter(vehicle_chargeability::Column::RefreshedAt.lt(cutoff))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        ids.iter()
            .map(|id| parse_id("vehicle_chargeability.vehicle_id", id))
            .collect()
    }

    async fn upsert_all(&self, entries: Vec<ChargeabilityCacheEntry>) -> DomainResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let rows = entries.len();
        let models = entries
            .into_iter()
            .map(domain_to_active)
            .collect::<DomainResult<Vec<_>>>()?;

        let txn = self.db.begin().await.map_err(db_err)?;
        vehicle_chargeability::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    vehicle_chargeability::Column::VehicleId,
                    vehicle_chargeability::Column::ZoneId,
                ])
                .update_columns([
                    vehicle_chargeability::Column::ChargePence,
                    vehicle_chargeability::Column::IsExempt,
                    vehicle_chargeability::Column::IsRetrofitted,
                    vehicle_chargeability::Column::TariffCode,
                    vehicle_chargeability::Column::RefreshedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        debug!(rows, "Chargeability rows upserted");
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        vehicle_chargeability::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
