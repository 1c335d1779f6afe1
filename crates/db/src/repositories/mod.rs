//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod billing;
pub mod building;
pub mod entry_log;
pub mod expense;
pub mod flat;
pub mod rent;
pub mod report;
pub mod tenant;
pub mod user;

pub use billing::{
    AllocationView, BillWithAllocations, BillingError, BillingRepository, NewBill, NewPayment,
    OutstandingBill, PaymentView,
};
pub use building::{BuildingDetails, BuildingError, BuildingInput, BuildingRepository};
pub use entry_log::{EntryLogError, EntryLogRepository, EntryLogView, NewEntryLog};
pub use expense::{ExpenseError, ExpenseInput, ExpenseRepository};
pub use flat::{FlatError, FlatListItem, FlatOption, FlatRepository, OwnedFlat};
pub use rent::{NewRent, RentDetails, RentError, RentRepository};
pub use report::{
    BuildingReport, BuildingSummary, OwnerDashboard, ReportError, ReportRepository,
    SuperAdminDashboard,
};
pub use tenant::{NewTenant, TenantError, TenantRepository, TenantWithFlat};
pub use user::{NewUser, UserError, UserRepository, UserSummary};

use sea_orm::{DbErr, SqlErr};

/// Returns true if `err` is a unique constraint violation on any backend.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// An update that matched no row means the row was deleted underneath us.
pub(crate) fn vanished_as<E: From<DbErr>>(err: DbErr, not_found: E) -> E {
    match err {
        DbErr::RecordNotUpdated => not_found,
        other => other.into(),
    }
}
