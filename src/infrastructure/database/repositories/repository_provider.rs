//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::chargeability_cache::ChargeabilityCacheRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::vehicle::FleetVehicleRepository;

use super::chargeability_cache_repository::SeaOrmChargeabilityCacheRepository;
use super::fleet_vehicle_repository::SeaOrmFleetVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let fleet = repos.fleet_vehicles().find_by_owner(owner_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    fleet_vehicles: SeaOrmFleetVehicleRepository,
    chargeability_cache: SeaOrmChargeabilityCacheRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            fleet_vehicles: SeaOrmFleetVehicleRepository::new(db.clone()),
            chargeability_cache: SeaOrmChargeabilityCacheRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn fleet_vehicles(&self) -> &dyn FleetVehicleRepository {
        &self.fleet_vehicles
    }

    fn chargeability_cache(&self) -> &dyn ChargeabilityCacheRepository {
        &self.chargeability_cache
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{ChargeabilityCacheEntry, FleetVehicle, VehicleType};
    use crate::infrastructure::database::migrator::Migrator;

    async fn provider() -> SeaOrmRepositoryProvider {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRepositoryProvider::new(db)
    }

    fn entry(vehicle_id: Uuid, zone_id: Uuid, charge: Option<Decimal>) -> ChargeabilityCacheEntry {
        ChargeabilityCacheEntry {
            vehicle_id,
            zone_id,
            charge,
            is_exempt: false,
            is_retrofitted: false,
            tariff_code: Some("BATH-C".into()),
            refreshed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fleet_vehicles_round_trip() {
        let repos = provider().await;
        let owner = Uuid::new_v4();
        let saved = repos
            .fleet_vehicles()
            .save(FleetVehicle::new(owner, "AB12CDE"))
            .await
            .unwrap();
        repos.fleet_vehicles().save(FleetVehicle::new(Uuid::new_v4(), "ZZ1")).await.unwrap();

        repos
            .fleet_vehicles()
            .update_vehicle_type(saved.id, Some(VehicleType::LargeVan))
            .await
            .unwrap();

        let fleet = repos.fleet_vehicles().find_by_owner(owner).await.unwrap();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].vehicle_type, Some(VehicleType::LargeVan));
        assert_eq!(repos.fleet_vehicles().find_all().await.unwrap().len(), 2);
        assert!(repos
            .fleet_vehicles()
            .update_vehicle_type(Uuid::new_v4(), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn upsert_overwrites_rows_by_vehicle_and_zone() {
        let repos = provider().await;
        let cache = repos.chargeability_cache();
        let (vehicle, zone_a, zone_b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        cache
            .upsert_all(vec![
                entry(vehicle, zone_a, Some(Decimal::new(1250, 2))),
                entry(vehicle, zone_b, None),
            ])
            .await
            .unwrap();
        cache
            .upsert_all(vec![entry(vehicle, zone_a, Some(Decimal::from(50)))])
            .await
            .unwrap();

        assert_eq!(cache.count().await.unwrap(), 2);
        let rows = cache.find_for_vehicles(&[vehicle]).await.unwrap();
        let a = rows.iter().find(|r| r.zone_id == zone_a).unwrap();
        let b = rows.iter().find(|r| r.zone_id == zone_b).unwrap();
        assert_eq!(a.charge, Some(Decimal::from(50)));
        assert_eq!(b.charge, None);
        assert!(cache.find_for_vehicles(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_rows_are_found_by_cutoff() {
        let repos = provider().await;
        let cache = repos.chargeability_cache();
        let (old, fresh) = (Uuid::new_v4(), Uuid::new_v4());
        let mut old_row = entry(old, Uuid::new_v4(), Some(Decimal::ZERO));
        old_row.refreshed_at = Utc::now() - Duration::days(10);

        cache
            .upsert_all(vec![old_row, entry(fresh, Uuid::new_v4(), Some(Decimal::ZERO))])
            .await
            .unwrap();

        let stale = cache
            .find_stale_vehicle_ids(Utc::now() - Duration::days(7))
            .await
            .unwrap();
        assert_eq!(stale, vec![old]);
    }
}
