//! `SeaORM` Entity for buildings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buildings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flats::Entity")]
    Flats,
    #[sea_orm(has_many = "super::common_bills::Entity")]
    CommonBills,
    #[sea_orm(has_many = "super::common_expenses::Entity")]
    CommonExpenses,
    #[sea_orm(has_many = "super::expense_payments::Entity")]
    ExpensePayments,
    #[sea_orm(has_many = "super::entry_logs::Entity")]
    EntryLogs,
}

impl Related<super::flats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flats.def()
    }
}

impl Related<super::common_bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommonBills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
