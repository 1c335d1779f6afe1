//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use ams_core::Role;
use ams_db::entities::{buildings, flats, users};
use ams_db::migration::{Migrator, MigratorTrait};
use ams_db::repositories::{BuildingInput, NewUser};
use ams_db::{BuildingRepository, FlatRepository, UserRepository};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with every migration applied.
///
/// A single pooled connection keeps every query on the same SQLite memory
/// database.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn user(db: &DatabaseConnection, email: &str, roles: &[Role]) -> users::Model {
    UserRepository::new(db.clone())
        .create(NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            full_name: email.split('@').next().unwrap_or(email).to_string(),
            phone_number: None,
            roles: roles.to_vec(),
        })
        .await
        .expect("Failed to create user")
}

pub async fn building(db: &DatabaseConnection, name: &str) -> buildings::Model {
    BuildingRepository::new(db.clone())
        .create(BuildingInput {
            name: name.to_string(),
            address: Some(format!("{name} Road")),
        })
        .await
        .expect("Failed to create building")
}

pub async fn flat(
    db: &DatabaseConnection,
    building_id: uuid::Uuid,
    number: &str,
    owner: Option<uuid::Uuid>,
) -> flats::Model {
    let repo = FlatRepository::new(db.clone());
    let flat = repo
        .create(building_id, number, false)
        .await
        .expect("Failed to create flat");
    match owner {
        Some(owner_id) => repo
            .assign_owner(flat.id, owner_id)
            .await
            .expect("Failed to assign owner"),
        None => flat,
    }
}
