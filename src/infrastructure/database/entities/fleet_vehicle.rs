//! Fleet vehicle entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fleet_vehicles")]
pub struct Model {
    /// UUID as text
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub owner_id: String,

    /// Normalised VRN
    pub vrn: String,

    /// Vehicle type code (e.g. "PRIVATE_CAR"), null until classified
    pub vehicle_type: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_chargeability::Entity")]
    Chargeability,
}

impl Related<super::vehicle_chargeability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chargeability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
