//! `SeaORM` Entity for entry_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub building_id: Uuid,
    pub flat_id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub visitor_name: String,
    #[sea_orm(column_type = "String(StringLen::N(20))", nullable)]
    pub phone_number: Option<String>,
    pub entry_type: EntryKind,
    pub number_of_persons: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub purpose: String,
    pub entry_time: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub exit_time: Option<DateTimeWithTimeZone>,
    #[sea_orm(nullable)]
    pub recorded_by: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "super::flats::Entity",
        from = "Column::FlatId",
        to = "super::flats::Column::Id",
        on_delete = "Cascade"
    )]
    Flats,
}

impl Related<super::buildings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buildings.def()
    }
}

impl Related<super::flats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
