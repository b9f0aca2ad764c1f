//! Fleet vehicle repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{FleetVehicle, VehicleType};
use crate::domain::DomainResult;

#[async_trait]
pub trait FleetVehicleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FleetVehicle>>;
    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<FleetVehicle>>;
    async fn find_all(&self) -> DomainResult<Vec<FleetVehicle>>;
    async fn save(&self, vehicle: FleetVehicle) -> DomainResult<FleetVehicle>;
    async fn update_vehicle_type(&self, id: Uuid, vehicle_type: Option<VehicleType>) -> DomainResult<()>;
}
