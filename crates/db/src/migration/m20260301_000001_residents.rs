//! Buildings, flats, accounts, tenants and rent.

use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entities::{buildings, flats, rents, tenants, user_roles, users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Creation order follows foreign keys.
        manager
            .create_table(schema.create_table_from_entity(buildings::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(users::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(user_roles::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(flats::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(tenants::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(rents::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_flats_building_number")
                    .table(flats::Entity)
                    .col(flats::Column::BuildingId)
                    .col(flats::Column::FlatNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_user_roles_user_role")
                    .table(user_roles::Entity)
                    .col(user_roles::Column::UserId)
                    .col(user_roles::Column::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_flats_owner")
                    .table(flats::Entity)
                    .col(flats::Column::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_tenants_flat")
                    .table(tenants::Entity)
                    .col(tenants::Column::FlatId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(rents::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tenants::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(flats::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user_roles::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(buildings::Entity).to_owned())
            .await
    }
}
