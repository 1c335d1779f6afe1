//! Visitor register.

use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entities::entry_logs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(entry_logs::Entity))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_entry_logs_building_time")
                    .table(entry_logs::Entity)
                    .col(entry_logs::Column::BuildingId)
                    .col(entry_logs::Column::EntryTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(entry_logs::Entity).to_owned())
            .await
    }
}
