//! Common bills, their allocations and payments, and standalone expenses.

use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entities::{common_bills, common_expenses, expense_allocations, expense_payments};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(common_bills::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(expense_allocations::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(expense_payments::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(common_expenses::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bills_building_date")
                    .table(common_bills::Entity)
                    .col(common_bills::Column::BuildingId)
                    .col(common_bills::Column::BillDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_allocations_bill_owner")
                    .table(expense_allocations::Entity)
                    .col(expense_allocations::Column::BillId)
                    .col(expense_allocations::Column::OwnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_allocations_owner")
                    .table(expense_allocations::Entity)
                    .col(expense_allocations::Column::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_bill")
                    .table(expense_payments::Entity)
                    .col(expense_payments::Column::BillId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(common_expenses::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(expense_payments::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(expense_allocations::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(common_bills::Entity).to_owned())
            .await
    }
}
