//! `SeaORM` entity definitions.

pub mod buildings;
pub mod common_bills;
pub mod common_expenses;
pub mod entry_logs;
pub mod expense_allocations;
pub mod expense_payments;
pub mod flats;
pub mod rents;
pub mod sea_orm_active_enums;
pub mod tenants;
pub mod user_roles;
pub mod users;
