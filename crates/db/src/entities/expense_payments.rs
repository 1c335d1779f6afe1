//! `SeaORM` Entity for expense_payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub building_id: Uuid,
    pub bill_id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    pub payment_date: Date,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::buildings::Entity",
        from = "Column::BuildingId",
        to = "super::buildings::Column::Id",
        on_delete = "Cascade"
    )]
    Buildings,
    // Bills with recorded payments cannot be deleted.
    #[sea_orm(
        belongs_to = "super::common_bills::Entity",
        from = "Column::BillId",
        to = "super::common_bills::Column::Id",
        on_delete = "NoAction"
    )]
    CommonBills,
}

impl Related<super::buildings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buildings.def()
    }
}

impl Related<super::common_bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommonBills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
