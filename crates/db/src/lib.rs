//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - Super admin provisioning

pub mod bootstrap;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use bootstrap::{BootstrapError, BootstrapOutcome, ensure_super_admin};
pub use migration::Migrator;
pub use repositories::{
    BillingRepository, BuildingRepository, EntryLogRepository, ExpenseRepository, FlatRepository,
    RentRepository, ReportRepository, TenantRepository, UserRepository,
};

use std::time::Duration;

use ams_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
