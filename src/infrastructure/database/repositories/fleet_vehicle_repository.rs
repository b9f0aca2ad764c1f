//! SeaORM implementation of FleetVehicleRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, FleetVehicle, FleetVehicleRepository, VehicleType};
use crate::infrastructure::database::entities::fleet_vehicle;

use super::{db_err, parse_id};

fn entity_to_domain(m: fleet_vehicle::Model) -> DomainResult<FleetVehicle> {
    Ok(FleetVehicle {
        id: parse_id("fleet_vehicles.id", &m.id)?,
        owner_id: parse_id("fleet_vehicles.owner_id", &m.owner_id)?,
        vrn: m.vrn,
        vehicle_type: m.vehicle_type.and_then(|code| code.parse::<VehicleType>().ok()),
    })
}

fn type_code(vehicle_type: Option<VehicleType>) -> Option<String> {
    vehicle_type.map(|t| t.code().to_string())
}

pub struct SeaOrmFleetVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmFleetVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FleetVehicleRepository for SeaOrmFleetVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FleetVehicle>> {
        let model = fleet_vehicle::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<FleetVehicle>> {
        let models = fleet_vehicle::Entity::find()
            .filter(fleet_vehicle::Column::OwnerId.eq(owner_id.to_string()))
            .order_by_asc(fleet_vehicle::Column::Vrn)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn find_all(&self) -> DomainResult<Vec<FleetVehicle>> {
        let models = fleet_vehicle::Entity::find()
            .order_by_asc(fleet_vehicle::Column::Vrn)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn save(&self, vehicle: FleetVehicle) -> DomainResult<FleetVehicle> {
        let model = fleet_vehicle::ActiveModel {
            id: Set(vehicle.id.to_string()),
            owner_id: Set(vehicle.owner_id.to_string()),
            vrn: Set(vehicle.vrn.clone()),
            vehicle_type: Set(type_code(vehicle.vehicle_type)),
            created_at: Set(Utc::now()),
        };
        fleet_vehicle::Entity::insert(model)
            .on_conflict(
                OnConflict::column(fleet_vehicle::Column::Id)
                    .update_columns([
                        fleet_vehicle::Column::OwnerId,
                        fleet_vehicle::Column::Vrn,
                        fleet_vehicle::Column::VehicleType,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        debug!(vehicle_id = %vehicle.id, "Fleet vehicle saved");
        Ok(vehicle)
    }

    async fn update_vehicle_type(&self, id: Uuid, vehicle_type: Option<VehicleType>) -> DomainResult<()> {
        let result = fleet_vehicle::Entity::update_many()
            .col_expr(fleet_vehicle::Column::VehicleType, Expr::value(type_code(vehicle_type)))
            .filter(fleet_vehicle::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "FleetVehicle",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }
}
