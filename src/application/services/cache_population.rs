//! Population of the persisted chargeability cache.
//!
//! Candidates are the fleet vehicles missing a row for at least one active
//! zone. They are split into disjoint batches processed by a bounded pool;
//! a vehicle gets all of its zone rows or none.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use dashmap::DashSet;
use futures_util::stream::{self, StreamExt};
use metrics::{counter, histogram};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{CachePopulationOutcome, CleanAirZone, ComplianceResults, DomainError, FleetVehicle};
use crate::shared::errors::{EngineError, EngineResult};
use crate::shared::retry::{engine_timeout, RetryPolicy};
use crate::shared::vrn::{matching_key, normalize_all};

use super::charge_calculation::ChargeCalculationService;

#[derive(Debug, Clone, Copy, Default)]
struct BatchReport {
    cached: usize,
    failed: usize,
}

impl ChargeCalculationService {
    /// Cache every vehicle of `owner_id` not yet cached for all active
    /// zones. `limit` caps the vehicles processed; 0 means all.
    pub async fn populate_cache(&self, owner_id: Uuid, limit: usize) -> EngineResult<CachePopulationOutcome> {
        let fleet = self.repos.fleet_vehicles().find_by_owner(owner_id).await?;
        let zones = self.zones_for(&[]).await?;
        let candidates = self.uncached(fleet, &zones, &HashSet::new()).await?;

        info!(%owner_id, candidates = candidates.len(), limit, "Populating chargeability cache");
        Ok(self.populate(candidates, &zones, limit).await)
    }

    /// Recalculate, across all owners, vehicles with missing rows or rows
    /// older than `cache_refresh_days`.
    pub async fn refresh_cache(&self, limit: usize) -> EngineResult<CachePopulationOutcome> {
        let fleet = self.repos.fleet_vehicles().find_all().await?;
        let zones = self.zones_for(&[]).await?;
        let cutoff = Utc::now() - chrono::Duration::days(self.engine.cache_refresh_days);
        let stale: HashSet<Uuid> = self
            .repos
            .chargeability_cache()
            .find_stale_vehicle_ids(cutoff)
            .await?
            .into_iter()
            .collect();
        let candidates = self.uncached(fleet, &zones, &stale).await?;

        info!(candidates = candidates.len(), stale = stale.len(), limit, "Refreshing chargeability cache");
        Ok(self.populate(candidates, &zones, limit).await)
    }

    /// Same pipeline for one vehicle, synchronously. Any failure is
    /// returned and nothing is written.
    pub async fn populate_cache_for_single_vehicle(&self, vehicle_id: Uuid, vrn: &str) -> EngineResult<()> {
        let zones = self.zones_for(&[]).await?;
        let results = self.check_in(vrn, &zones).await?;
        let entries = Self::cache_entries(vehicle_id, &results, Utc::now());
        let rows = entries.len();

        self.repos.chargeability_cache().upsert_all(entries).await?;
        counter!("chargeability_cache_rows_written_total").increment(rows as u64);
        self.store_vehicle_type(vehicle_id, &results).await;

        info!(%vehicle_id, rows, "Vehicle cached");
        Ok(())
    }

    /// Fleet vehicles lacking a row for some active zone, plus any in `stale`.
    async fn uncached(
        &self,
        fleet: Vec<FleetVehicle>,
        zones: &[CleanAirZone],
        stale: &HashSet<Uuid>,
    ) -> EngineResult<Vec<FleetVehicle>> {
        if fleet.is_empty() {
            return Ok(fleet);
        }
        let ids: Vec<Uuid> = fleet.iter().map(|v| v.id).collect();
        let active: HashSet<Uuid> = zones.iter().map(|z| z.id).collect();

        let mut covered: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for row in self.repos.chargeability_cache().find_for_vehicles(&ids).await? {
            if active.contains(&row.zone_id) {
                covered.entry(row.vehicle_id).or_default().insert(row.zone_id);
            }
        }

        Ok(fleet
            .into_iter()
            .filter(|v| stale.contains(&v.id) || covered.get(&v.id).map_or(0, HashSet::len) < active.len())
            .collect())
    }

    async fn populate(&self, candidates: Vec<FleetVehicle>, zones: &[CleanAirZone], limit: usize) -> CachePopulationOutcome {
        if candidates.is_empty() {
            info!("Nothing to cache");
            return CachePopulationOutcome::NothingToProcess;
        }

        let total = candidates.len();
        let selected = if limit == 0 { total } else { limit.min(total) };
        let remaining = total - selected;
        let batch_size = self.engine.bulk_check_batch_size.max(1);

        let batches: Vec<_> = candidates[..selected]
            .chunks(batch_size)
            .enumerate()
            .map(|(index, batch)| self.run_batch(index, batch, zones))
            .collect();
        let reports: Vec<BatchReport> = stream::iter(batches)
            .buffer_unordered(self.engine.worker_count.max(1))
            .collect()
            .await;

        let cached: usize = reports.iter().map(|r| r.cached).sum();
        let failed: usize = reports.iter().map(|r| r.failed).sum();
        if failed > 0 {
            counter!("chargeability_cache_failed_vehicles_total").increment(failed as u64);
        }

        let outcome = if failed > 0 {
            CachePopulationOutcome::PartiallyProcessed { failed }
        } else if remaining > 0 {
            CachePopulationOutcome::BatchProcessedMoreRemaining { remaining }
        } else {
            CachePopulationOutcome::AllProcessed
        };
        info!(batches = reports.len(), cached, failed, remaining, %outcome, "Cache population finished");
        outcome
    }

    /// One batch with bounded retries. Each attempt only handles the
    /// vehicles earlier attempts did not cache.
    async fn run_batch(&self, index: usize, batch: &[FleetVehicle], zones: &[CleanAirZone]) -> BatchReport {
        let started = Instant::now();
        let done = DashSet::new();
        let operation = format!("cache_batch_{}", index);
        let op = operation.as_str();
        let timeout = self.batch_timeout();
        let policy = RetryPolicy::from(&self.engine.retry);
        let cached_ids = &done;

        let result = policy
            .run(
                op,
                move || engine_timeout(op, timeout, self.process_batch(batch, zones, cached_ids)),
                EngineError::is_transient,
            )
            .await;
        histogram!("cache_population_batch_seconds").record(started.elapsed().as_secs_f64());

        let report = BatchReport {
            cached: done.len(),
            failed: batch.len() - done.len(),
        };
        match result {
            Ok(()) => debug!(batch = index, cached = report.cached, "Batch cached"),
            Err(e) => warn!(batch = index, cached = report.cached, failed = report.failed, error = %e, "Batch gave up"),
        }
        report
    }

    async fn process_batch(
        &self,
        batch: &[FleetVehicle],
        zones: &[CleanAirZone],
        done: &DashSet<Uuid>,
    ) -> EngineResult<()> {
        let pending: Vec<&FleetVehicle> = batch.iter().filter(|v| !done.contains(&v.id)).collect();
        if pending.is_empty() {
            return Ok(());
        }

        let vrns = normalize_all(pending.iter().map(|v| v.vrn.as_str()));
        let (resolved, unresolved) = self.resolve_many(&vrns).await;
        for u in &unresolved {
            debug!(reason = %u.reason, "Vehicle left uncached");
        }

        let results: HashMap<String, ComplianceResults> = resolved
            .into_iter()
            .map(|r| {
                let results = self.evaluate(r, zones);
                (matching_key(&results.vrn), results)
            })
            .collect();

        let refreshed_at = Utc::now();
        let mut failed = 0;
        for vehicle in &pending {
            let Some(results) = results.get(&matching_key(&vehicle.vrn)) else {
                failed += 1;
                continue;
            };
            let entries = Self::cache_entries(vehicle.id, results, refreshed_at);
            let rows = entries.len();
            match self.repos.chargeability_cache().upsert_all(entries).await {
                Ok(()) => {
                    counter!("chargeability_cache_rows_written_total").increment(rows as u64);
                    done.insert(vehicle.id);
                    if vehicle.vehicle_type != results.classified_type {
                        self.store_vehicle_type(vehicle.id, results).await;
                    }
                }
                Err(e) => {
                    warn!(vehicle_id = %vehicle.id, error = %e, "Cache rows not written");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(EngineError::IncompleteBatch {
                failed,
                total: pending.len(),
            });
        }
        Ok(())
    }

    /// Keep the fleet record's physical type in line with the latest
    /// classification. A failure here does not undo the cache rows.
    async fn store_vehicle_type(&self, vehicle_id: Uuid, results: &ComplianceResults) {
        if let Err(e) = self
            .repos
            .fleet_vehicles()
            .update_vehicle_type(vehicle_id, results.classified_type)
            .await
        {
            match e {
                DomainError::NotFound { .. } => debug!(%vehicle_id, "Vehicle not in fleet, type not stored"),
                e => warn!(%vehicle_id, error = %e, "Vehicle type not stored"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{car, fixture, fixture_with, test_config, Fixture};
    use crate::config::AppConfig;
    use crate::domain::exemption::{MilitaryRecord, TaxiLicence};
    use crate::domain::{ChargeabilityCacheRepository, FleetVehicleRepository, VehicleType};

    /// One vehicle per batch, with a batch deadline well under the call timeout.
    fn tight_batch_config() -> AppConfig {
        let mut config = test_config();
        config.engine.bulk_check_batch_size = 1;
        config.engine.batch_timeout_secs = 1;
        config.engine.call_timeout_secs = 30;
        config
    }

    async fn fleet_of(fixture: &Fixture, owner: Uuid, vrns: &[&str]) -> Vec<FleetVehicle> {
        let mut vehicles = Vec::new();
        for vrn in vrns {
            fixture
                .ports
                .vehicle_details
                .insert(car(vrn, "diesel", "2010-01-01"));
            let saved = fixture.storage.fleet.save(FleetVehicle::new(owner, *vrn)).await.unwrap();
            vehicles.push(saved);
        }
        vehicles
    }

    #[tokio::test]
    async fn five_vehicles_two_zones_write_ten_rows() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        fleet_of(&fx, owner, &["AA1", "BB2", "CC3", "DD4", "EE5"]).await;

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::AllProcessed);
        assert_eq!(fx.storage.cache.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn second_run_has_nothing_to_process() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        fleet_of(&fx, owner, &["AA1", "BB2", "CC3"]).await;

        fx.engine.calculation.populate_cache(owner, 0).await.unwrap();
        let before = fx.storage.cache.entries().len();
        let detail_calls = fx.ports.vehicle_details.calls();

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::NothingToProcess);
        assert_eq!(fx.storage.cache.entries().len(), before);
        assert_eq!(fx.ports.vehicle_details.calls(), detail_calls);
    }

    #[tokio::test]
    async fn failing_vehicle_gets_no_rows() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["GOOD1", "BAD1"]).await;
        fx.ports.vehicle_details.fail_for("BAD1");

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::PartiallyProcessed { failed: 1 });
        let bad = fleet.iter().find(|v| v.vrn == "BAD1").unwrap();
        let good = fleet.iter().find(|v| v.vrn == "GOOD1").unwrap();
        assert!(fx.storage.cache.get(bad.id, fx.zones.class_c.id).is_none());
        assert!(fx.storage.cache.get(bad.id, fx.zones.class_d.id).is_none());
        assert!(fx.storage.cache.get(good.id, fx.zones.class_d.id).is_some());
    }

    #[tokio::test]
    async fn failed_write_keeps_vehicle_uncached_and_retries() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["AA1", "BB2"]).await;
        fx.storage.cache.fail_writes_for(fleet[0].id);

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::PartiallyProcessed { failed: 1 });
        assert_eq!(fx.storage.cache.count().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_timing_out_once_is_retried_to_completion() {
        let fx = fixture_with(tight_batch_config());
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["AA1", "SLOW1"]).await;
        fx.ports.vehicle_details.stall_for("SLOW1", 1);

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::AllProcessed);
        assert_eq!(fx.storage.cache.count().await.unwrap(), 4);
        let slow = fleet.iter().find(|v| v.vrn == "SLOW1").unwrap();
        assert!(fx.storage.cache.get(slow.id, fx.zones.class_d.id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_that_keeps_timing_out_does_not_stop_its_siblings() {
        let fx = fixture_with(tight_batch_config());
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["AA1", "BB2", "SLOW1"]).await;
        fx.ports.vehicle_details.stall_for("SLOW1", usize::MAX);

        let outcome = fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        assert_eq!(outcome, CachePopulationOutcome::PartiallyProcessed { failed: 1 });
        assert_eq!(fx.storage.cache.count().await.unwrap(), 4);
        for vehicle in &fleet {
            let row = fx.storage.cache.get(vehicle.id, fx.zones.class_c.id);
            assert_eq!(row.is_some(), vehicle.vrn != "SLOW1", "{}", vehicle.vrn);
        }
    }

    #[tokio::test]
    async fn taxi_is_stored_with_its_physical_type() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["CAB1"]).await;
        fx.ports.taxi.insert(TaxiLicence {
            vrn: "CAB1".into(),
            wheelchair_accessible: Some(false),
            licensing_authorities: vec![],
        });

        fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        let stored = fx.storage.fleet.find_by_id(fleet[0].id).await.unwrap().unwrap();
        assert_eq!(stored.vehicle_type, Some(VehicleType::PrivateCar));

        fx.engine
            .calculation
            .populate_cache_for_single_vehicle(fleet[0].id, "CAB1")
            .await
            .unwrap();
        let stored = fx.storage.fleet.find_by_id(fleet[0].id).await.unwrap().unwrap();
        assert_eq!(stored.vehicle_type, Some(VehicleType::PrivateCar));
    }

    #[tokio::test]
    async fn limit_leaves_remaining_vehicles_for_later() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        fleet_of(&fx, owner, &["AA1", "BB2", "CC3", "DD4", "EE5"]).await;

        let first = fx.engine.calculation.populate_cache(owner, 3).await.unwrap();
        assert_eq!(first, CachePopulationOutcome::BatchProcessedMoreRemaining { remaining: 2 });
        assert_eq!(fx.storage.cache.count().await.unwrap(), 6);

        let second = fx.engine.calculation.populate_cache(owner, 3).await.unwrap();
        assert_eq!(second, CachePopulationOutcome::AllProcessed);
        assert_eq!(fx.storage.cache.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn exempt_vehicle_rows_and_fleet_type_are_stored() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["CAS312", "CAR1"]).await;
        fx.ports.military.insert(MilitaryRecord {
            vrn: "CAS312".into(),
            exemption_code: Some("WDC001".into()),
        });

        fx.engine.calculation.populate_cache(owner, 0).await.unwrap();

        let military = &fleet[0];
        let row = fx.storage.cache.get(military.id, fx.zones.class_d.id).unwrap();
        assert!(row.is_exempt);
        assert_eq!(row.charge, Some(rust_decimal::Decimal::ZERO));

        let stored = fx.storage.fleet.find_by_id(fleet[1].id).await.unwrap().unwrap();
        assert_eq!(stored.vehicle_type, Some(VehicleType::PrivateCar));
        let charged = fx.storage.cache.get(stored.id, fx.zones.class_d.id).unwrap();
        assert_eq!(charged.charge, Some(rust_decimal::Decimal::from(50)));
    }

    #[tokio::test]
    async fn refresh_recalculates_stale_rows_across_owners() {
        let fx = fixture_with(test_config());
        let (owner_a, owner_b) = (Uuid::new_v4(), Uuid::new_v4());
        let a = fleet_of(&fx, owner_a, &["AA1"]).await;
        fleet_of(&fx, owner_b, &["BB2"]).await;

        assert_eq!(
            fx.engine.calculation.refresh_cache(0).await.unwrap(),
            CachePopulationOutcome::AllProcessed
        );
        assert_eq!(
            fx.engine.calculation.refresh_cache(0).await.unwrap(),
            CachePopulationOutcome::NothingToProcess
        );

        fx.storage
            .cache
            .set_refreshed_at(a[0].id, Utc::now() - chrono::Duration::days(30));
        assert_eq!(
            fx.engine.calculation.refresh_cache(0).await.unwrap(),
            CachePopulationOutcome::AllProcessed
        );
        let row = fx.storage.cache.get(a[0].id, fx.zones.class_c.id).unwrap();
        assert!(row.refreshed_at > Utc::now() - chrono::Duration::days(1));
    }

    #[tokio::test]
    async fn single_vehicle_population_fails_loudly() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let fleet = fleet_of(&fx, owner, &["AA1"]).await;

        fx.engine
            .calculation
            .populate_cache_for_single_vehicle(fleet[0].id, "AA1")
            .await
            .unwrap();
        assert_eq!(fx.storage.cache.count().await.unwrap(), 2);

        fx.ports.vehicle_details.fail_for("ZZ9");
        let err = fx
            .engine
            .calculation
            .populate_cache_for_single_vehicle(Uuid::new_v4(), "ZZ9")
            .await;
        assert!(err.is_err());
        assert_eq!(fx.storage.cache.count().await.unwrap(), 2);
    }
}
