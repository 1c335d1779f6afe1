//! `SeaORM` Entity for tenants table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub flat_id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub full_name: String,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub email: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub phone_number: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flats::Entity",
        from = "Column::FlatId",
        to = "super::flats::Column::Id",
        on_delete = "Cascade"
    )]
    Flats,
    #[sea_orm(has_many = "super::rents::Entity")]
    Rents,
}

impl Related<super::flats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flats.def()
    }
}

impl Related<super::rents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
