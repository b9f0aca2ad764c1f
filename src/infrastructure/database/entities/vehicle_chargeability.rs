//! Persisted chargeability cache row, one per (vehicle, zone)

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicle_chargeability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vehicle_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub zone_id: String,

    /// Charge in pence; null when compliance could not be determined
    pub charge_pence: Option<i64>,

    pub is_exempt: bool,

    pub is_retrofitted: bool,

    pub tariff_code: Option<String>,

    pub refreshed_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fleet_vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::fleet_vehicle::Column::Id"
    )]
    FleetVehicle,
}

impl Related<super::fleet_vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FleetVehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
