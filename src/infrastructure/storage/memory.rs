//! In-memory implementations of every repository and outbound port.
//!
//! Used by the CLI when running from a fixtures file and by tests. Lookups
//! can be made to fail or stall per VRN to exercise partial-failure paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use crate::application::ports::{RegistryPort, VehicleDetailsProvider, ZoneCatalog};
use crate::application::services::ExternalPorts;
use crate::domain::{
    ChargeabilityCacheEntry, ChargeabilityCacheRepository, CleanAirZone, DomainError, DomainResult,
    FleetVehicle, FleetVehicleRepository, RepositoryProvider, Vehicle, VehicleType,
};
use crate::domain::exemption::{
    MilitaryRecord, RegistryRecord, RetrofitRecord, TaxiLicence, WhitelistEntry,
};
use crate::shared::errors::LookupError;
use crate::shared::vrn::matching_key;

// ── Repositories ───────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryFleetVehicleRepository {
    vehicles: DashMap<Uuid, FleetVehicle>,
}

#[async_trait]
impl FleetVehicleRepository for InMemoryFleetVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FleetVehicle>> {
        Ok(self.vehicles.get(&id).map(|v| v.clone()))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<FleetVehicle>> {
        let mut vehicles: Vec<_> = self
            .vehicles
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.clone())
            .collect();
        vehicles.sort_by(|a, b| a.vrn.cmp(&b.vrn));
        Ok(vehicles)
    }

    async fn find_all(&self) -> DomainResult<Vec<FleetVehicle>> {
        let mut vehicles: Vec<_> = self.vehicles.iter().map(|v| v.clone()).collect();
        vehicles.sort_by(|a, b| a.vrn.cmp(&b.vrn));
        Ok(vehicles)
    }

    async fn save(&self, vehicle: FleetVehicle) -> DomainResult<FleetVehicle> {
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle_type(&self, id: Uuid, vehicle_type: Option<VehicleType>) -> DomainResult<()> {
        let mut vehicle = self.vehicles.get_mut(&id).ok_or_else(|| DomainError::NotFound {
            entity: "FleetVehicle",
            field: "id",
            value: id.to_string(),
        })?;
        vehicle.vehicle_type = vehicle_type;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChargeabilityCache {
    entries: DashMap<(Uuid, Uuid), ChargeabilityCacheEntry>,
    /// Upserts touching these vehicles fail as a whole.
    failing_vehicles: DashSet<Uuid>,
}

impl InMemoryChargeabilityCache {
    pub fn fail_writes_for(&self, vehicle_id: Uuid) {
        self.failing_vehicles.insert(vehicle_id);
    }

    pub fn get(&self, vehicle_id: Uuid, zone_id: Uuid) -> Option<ChargeabilityCacheEntry> {
        self.entries.get(&(vehicle_id, zone_id)).map(|e| e.clone())
    }

    pub fn entries(&self) -> Vec<ChargeabilityCacheEntry> {
        self.entries.iter().map(|e| e.clone()).collect()
    }

    /// Backdate every row of `vehicle_id`.
    pub fn set_refreshed_at(&self, vehicle_id: Uuid, at: DateTime<Utc>) {
        for mut entry in self.entries.iter_mut().filter(|e| e.vehicle_id == vehicle_id) {
            entry.refreshed_at = at;
        }
    }
}

#[async_trait]
impl ChargeabilityCacheRepository for InMemoryChargeabilityCache {
    async fn find_for_vehicles(&self, vehicle_ids: &[Uuid]) -> DomainResult<Vec<ChargeabilityCacheEntry>> {
        let ids: HashSet<_> = vehicle_ids.iter().collect();
        Ok(self
            .entries
            .iter()
            .filter(|e| ids.contains(&e.vehicle_id))
            .map(|e| e.clone())
            .collect())
    }

    async fn find_stale_vehicle_ids(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Uuid>> {
        let stale: HashSet<Uuid> = self
            .entries
            .iter()
            .filter(|e| e.refreshed_at < cutoff)
            .map(|e| e.vehicle_id)
            .collect();
        Ok(stale.into_iter().collect())
    }

    async fn upsert_all(&self, entries: Vec<ChargeabilityCacheEntry>) -> DomainResult<()> {
        if let Some(e) = entries.iter().find(|e| self.failing_vehicles.contains(&e.vehicle_id)) {
            return Err(DomainError::Validation(format!(
                "Database error: write rejected for vehicle {}",
                e.vehicle_id
            )));
        }
        for entry in entries {
            self.entries.insert((entry.vehicle_id, entry.zone_id), entry);
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.entries.len() as u64)
    }
}

/// In-memory [`RepositoryProvider`].
#[derive(Default)]
pub struct InMemoryStorage {
    pub fleet: InMemoryFleetVehicleRepository,
    pub cache: InMemoryChargeabilityCache,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn fleet_vehicles(&self) -> &dyn FleetVehicleRepository {
        &self.fleet
    }

    fn chargeability_cache(&self) -> &dyn ChargeabilityCacheRepository {
        &self.cache
    }
}

// ── Outbound ports ─────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryZoneCatalog {
    zones: DashMap<Uuid, CleanAirZone>,
    calls: AtomicUsize,
}

impl InMemoryZoneCatalog {
    pub fn new(zones: impl IntoIterator<Item = CleanAirZone>) -> Self {
        let catalog = Self::default();
        for zone in zones {
            catalog.zones.insert(zone.id, zone);
        }
        catalog
    }

    pub fn insert(&self, zone: CleanAirZone) {
        self.zones.insert(zone.id, zone);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneCatalog for InMemoryZoneCatalog {
    async fn zones(&self) -> Result<Vec<CleanAirZone>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut zones: Vec<_> = self.zones.iter().map(|z| z.clone()).collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(zones)
    }
}

/// VRN-keyed store shared by the registry and vehicle-details fakes.
struct VrnStore<T> {
    name: &'static str,
    records: DashMap<String, T>,
    failing: DashSet<String>,
    calls: AtomicUsize,
}

impl<T: Clone> VrnStore<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            records: DashMap::new(),
            failing: DashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn find(&self, vrn: &str) -> Result<Option<T>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = matching_key(vrn);
        if self.failing.contains(&key) {
            return Err(LookupError::Service(format!("{} unavailable", self.name)));
        }
        Ok(self.records.get(&key).map(|r| r.clone()))
    }

    fn find_many(&self, vrns: &[String]) -> Result<Vec<T>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let keys: Vec<_> = vrns.iter().map(|v| matching_key(v)).collect();
        if keys.iter().any(|k| self.failing.contains(k)) {
            return Err(LookupError::Service(format!("{} unavailable", self.name)));
        }
        Ok(keys
            .iter()
            .filter_map(|k| self.records.get(k).map(|r| r.clone()))
            .collect())
    }
}

/// In-memory registry for any [`RegistryRecord`].
pub struct InMemoryRegistry<R: RegistryRecord> {
    store: VrnStore<R>,
}

impl<R: RegistryRecord> Default for InMemoryRegistry<R> {
    fn default() -> Self {
        Self {
            store: VrnStore::new(R::SOURCE.as_str()),
        }
    }
}

impl<R: RegistryRecord> InMemoryRegistry<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        let registry = Self::default();
        for record in records {
            registry.insert(record);
        }
        registry
    }

    pub fn insert(&self, record: R) {
        self.store.records.insert(matching_key(record.vrn()), record);
    }

    /// Every call mentioning `vrn` fails with a service error.
    pub fn fail_for(&self, vrn: &str) {
        self.store.failing.insert(matching_key(vrn));
    }

    pub fn calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: RegistryRecord> RegistryPort<R> for InMemoryRegistry<R> {
    async fn find(&self, vrn: &str) -> Result<Option<R>, LookupError> {
        self.store.find(vrn)
    }

    async fn find_many(&self, vrns: &[String]) -> Result<Vec<R>, LookupError> {
        self.store.find_many(vrns)
    }
}

/// How long a stalled vehicle-details call hangs before answering.
const STALL: Duration = Duration::from_secs(3600);

pub struct InMemoryVehicleDetails {
    store: VrnStore<Vehicle>,
    stalls: DashMap<String, usize>,
}

impl Default for InMemoryVehicleDetails {
    fn default() -> Self {
        Self {
            store: VrnStore::new("vehicle details"),
            stalls: DashMap::new(),
        }
    }
}

impl InMemoryVehicleDetails {
    pub fn new(vehicles: impl IntoIterator<Item = Vehicle>) -> Self {
        let details = Self::default();
        for vehicle in vehicles {
            details.insert(vehicle);
        }
        details
    }

    pub fn insert(&self, vehicle: Vehicle) {
        self.store.records.insert(matching_key(&vehicle.vrn), vehicle);
    }

    pub fn fail_for(&self, vrn: &str) {
        self.store.failing.insert(matching_key(vrn));
    }

    /// The next `calls` requests touching `vrn` hang before answering.
    /// `usize::MAX` stalls every request.
    pub fn stall_for(&self, vrn: &str, calls: usize) {
        self.stalls.insert(matching_key(vrn), calls);
    }

    pub fn calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }

    /// Consume one stall from each stalled key; true when any was stalled.
    fn take_stall<'a>(&self, vrns: impl IntoIterator<Item = &'a str>) -> bool {
        let mut stalled = false;
        for vrn in vrns {
            if let Some(mut left) = self.stalls.get_mut(&matching_key(vrn)) {
                if *left > 0 {
                    *left = left.saturating_sub(1);
                    stalled = true;
                }
            }
        }
        stalled
    }
}

#[async_trait]
impl VehicleDetailsProvider for InMemoryVehicleDetails {
    async fn find(&self, vrn: &str) -> Result<Option<Vehicle>, LookupError> {
        if self.take_stall([vrn]) {
            tokio::time::sleep(STALL).await;
        }
        self.store.find(vrn)
    }

    async fn find_many(&self, vrns: &[String]) -> Result<Vec<Vehicle>, LookupError> {
        if self.take_stall(vrns.iter().map(String::as_str)) {
            tokio::time::sleep(STALL).await;
        }
        self.store.find_many(vrns)
    }
}

/// Convenience bundle of every in-memory port.
#[derive(Clone)]
pub struct InMemoryPorts {
    pub zones: Arc<InMemoryZoneCatalog>,
    pub vehicle_details: Arc<InMemoryVehicleDetails>,
    pub military: Arc<InMemoryRegistry<MilitaryRecord>>,
    pub whitelist: Arc<InMemoryRegistry<WhitelistEntry>>,
    pub retrofit: Arc<InMemoryRegistry<RetrofitRecord>>,
    pub taxi: Arc<InMemoryRegistry<TaxiLicence>>,
}

impl Default for InMemoryPorts {
    fn default() -> Self {
        Self {
            zones: Arc::new(InMemoryZoneCatalog::default()),
            vehicle_details: Arc::new(InMemoryVehicleDetails::default()),
            military: Arc::new(InMemoryRegistry::default()),
            whitelist: Arc::new(InMemoryRegistry::default()),
            retrofit: Arc::new(InMemoryRegistry::default()),
            taxi: Arc::new(InMemoryRegistry::default()),
        }
    }
}

impl InMemoryPorts {
    pub fn external(&self) -> ExternalPorts {
        ExternalPorts {
            zones: self.zones.clone(),
            vehicle_details: self.vehicle_details.clone(),
            military: self.military.clone(),
            whitelist: self.whitelist.clone(),
            retrofit: self.retrofit.clone(),
            taxi: self.taxi.clone(),
        }
    }
}
