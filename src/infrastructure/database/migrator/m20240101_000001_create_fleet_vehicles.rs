//! Create fleet_vehicles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FleetVehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FleetVehicles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FleetVehicles::OwnerId).string().not_null())
                    .col(ColumnDef::new(FleetVehicles::Vrn).string().not_null())
                    .col(ColumnDef::new(FleetVehicles::VehicleType).string())
                    .col(
                        ColumnDef::new(FleetVehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fleet_vehicles_owner_id")
                    .table(FleetVehicles::Table)
                    .col(FleetVehicles::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FleetVehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FleetVehicles {
    Table,
    Id,
    OwnerId,
    Vrn,
    VehicleType,
    CreatedAt,
}
