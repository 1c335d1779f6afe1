//! Database migrations.
//!
//! Tables are generated from the entity definitions so the same migrations
//! run against Postgres in production and SQLite in tests.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_residents;
mod m20260301_000002_billing;
mod m20260301_000003_entry_logs;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_residents::Migration),
            Box::new(m20260301_000002_billing::Migration),
            Box::new(m20260301_000003_entry_logs::Migration),
        ]
    }
}
