//! Core business logic for the apartment management service.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `auth` - Roles and password hashing
//! - `access` - Who may act on which building, flat, or tenant
//! - `billing` - Splitting common bills across owners, payment checks
//! - `entry_log` - Visitor register validation
//! - `reports` - Balance arithmetic for reports and dashboards

pub mod access;
pub mod auth;
pub mod billing;
pub mod entry_log;
pub mod reports;

pub use access::{AccessError, BuildingScope, Principal};
pub use auth::Role;
