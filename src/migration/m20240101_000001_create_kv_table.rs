use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BeaconKv::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BeaconKv::Key).text().not_null().primary_key())
                    .col(ColumnDef::new(BeaconKv::Value).text().not_null())
                    .col(
                        ColumnDef::new(BeaconKv::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BeaconKv::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BeaconKv {
    Table,
    Key,
    Value,
    UpdatedAt,
}
