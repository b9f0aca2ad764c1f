//! JSON fixture loader.
//!
//! Seeds the in-memory ports (zones, vehicle details, registries) and the
//! fleet repository from one file, so the engine can run without any live
//! registry:
//!
//! ```json
//! {
//!   "zones":    [{ "id": "...", "name": "Bath", "tariff_class": "C", "tariff_code": "BATH-C" }],
//!   "vehicles": [{ "vrn": "AB12CDE", "type_approval": "M1", "fuel_type": "diesel" }],
//!   "fleet":    [{ "owner_id": "...", "vrn": "AB12CDE" }],
//!   "military": [{ "vrn": "CAS312" }],
//!   "taxi":     [{ "vrn": "TX1", "wheelchair_accessible": true }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::domain::exemption::{MilitaryRecord, RetrofitRecord, TaxiLicence, WhitelistEntry};
use crate::domain::{CleanAirZone, DomainResult, FleetVehicle, FleetVehicleRepository, Vehicle, VehicleType};
use crate::shared::errors::InfraError;
use crate::shared::vrn::normalize_vrn;

use super::storage::{InMemoryPorts, InMemoryRegistry, InMemoryVehicleDetails, InMemoryZoneCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetFixture {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub owner_id: Uuid,
    pub vrn: String,
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
}

impl From<&FleetFixture> for FleetVehicle {
    fn from(f: &FleetFixture) -> Self {
        let mut vehicle = FleetVehicle::new(f.owner_id, normalize_vrn(&f.vrn));
        if let Some(id) = f.id {
            vehicle.id = id;
        }
        vehicle.vehicle_type = f.vehicle_type;
        vehicle
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub zones: Vec<CleanAirZone>,
    pub vehicles: Vec<Vehicle>,
    pub fleet: Vec<FleetFixture>,
    pub military: Vec<MilitaryRecord>,
    pub whitelist: Vec<WhitelistEntry>,
    pub retrofit: Vec<RetrofitRecord>,
    pub taxi: Vec<TaxiLicence>,
}

impl Fixtures {
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = std::fs::read_to_string(path)?;
        let fixtures = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            zones = fixtures.zones.len(),
            vehicles = fixtures.vehicles.len(),
            fleet = fixtures.fleet.len(),
            "Fixtures loaded"
        );
        Ok(fixtures)
    }

    pub fn from_json(raw: &str) -> Result<Self, InfraError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build in-memory ports answering from this file.
    pub fn ports(&self) -> InMemoryPorts {
        InMemoryPorts {
            zones: InMemoryZoneCatalog::new(self.zones.iter().cloned()).into(),
            vehicle_details: InMemoryVehicleDetails::new(self.vehicles.iter().cloned()).into(),
            military: InMemoryRegistry::new(self.military.iter().cloned()).into(),
            whitelist: InMemoryRegistry::new(self.whitelist.iter().cloned()).into(),
            retrofit: InMemoryRegistry::new(self.retrofit.iter().cloned()).into(),
            taxi: InMemoryRegistry::new(self.taxi.iter().cloned()).into(),
        }
    }

    /// Save every fleet entry; returns the number written.
    pub async fn seed_fleet(&self, repo: &dyn FleetVehicleRepository) -> DomainResult<usize> {
        for entry in &self.fleet {
            repo.save(FleetVehicle::from(entry)).await?;
        }
        Ok(self.fleet.len())
    }
}
