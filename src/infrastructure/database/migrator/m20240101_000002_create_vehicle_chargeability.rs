//! Create vehicle_chargeability table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleChargeability::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleChargeability::VehicleId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleChargeability::ZoneId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleChargeability::ChargePence).big_integer())
                    .col(
                        ColumnDef::new(VehicleChargeability::IsExempt)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VehicleChargeability::IsRetrofitted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(VehicleChargeability::TariffCode).string())
                    .col(
                        ColumnDef::new(VehicleChargeability::RefreshedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(VehicleChargeability::VehicleId)
                            .col(VehicleChargeability::ZoneId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_chargeability_refreshed_at")
                    .table(VehicleChargeability::Table)
                    .col(VehicleChargeability::RefreshedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleChargeability::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehicleChargeability {
    Table,
    VehicleId,
    ZoneId,
    ChargePence,
    IsExempt,
    IsRetrofitted,
    TariffCode,
    RefreshedAt,
}
