//! Enums stored as short strings so the schema works on Postgres and SQLite alike.

use ams_core::Role;
use ams_core::entry_log::EntryType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RoleName {
    #[sea_orm(string_value = "SuperAdmin")]
    SuperAdmin,
    #[sea_orm(string_value = "President")]
    President,
    #[sea_orm(string_value = "Owner")]
    Owner,
    #[sea_orm(string_value = "Tenant")]
    Tenant,
    #[sea_orm(string_value = "User")]
    User,
}

impl From<Role> for RoleName {
    fn from(role: Role) -> Self {
        match role {
            Role::SuperAdmin => Self::SuperAdmin,
            Role::President => Self::President,
            Role::Owner => Self::Owner,
            Role::Tenant => Self::Tenant,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(role: RoleName) -> Self {
        match role {
            RoleName::SuperAdmin => Self::SuperAdmin,
            RoleName::President => Self::President,
            RoleName::Owner => Self::Owner,
            RoleName::Tenant => Self::Tenant,
            RoleName::User => Self::User,
        }
    }
}

/// Stored entry log category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum EntryKind {
    #[sea_orm(string_value = "Visitor")]
    Visitor,
    #[sea_orm(string_value = "Delivery")]
    Delivery,
    #[sea_orm(string_value = "Teacher")]
    Teacher,
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl From<EntryType> for EntryKind {
    fn from(kind: EntryType) -> Self {
        match kind {
            EntryType::Visitor => Self::Visitor,
            EntryType::Delivery => Self::Delivery,
            EntryType::Teacher => Self::Teacher,
            EntryType::Maintenance => Self::Maintenance,
            EntryType::Other => Self::Other,
        }
    }
}

impl From<EntryKind> for EntryType {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Visitor => Self::Visitor,
            EntryKind::Delivery => Self::Delivery,
            EntryKind::Teacher => Self::Teacher,
            EntryKind::Maintenance => Self::Maintenance,
            EntryKind::Other => Self::Other,
        }
    }
}
