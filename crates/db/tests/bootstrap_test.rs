//! Integration tests for super admin provisioning.

mod common;

use ams_core::Role;
use ams_db::{BootstrapOutcome, UserRepository, ensure_super_admin};
use ams_shared::config::BootstrapConfig;

fn config(password: &str) -> BootstrapConfig {
    BootstrapConfig {
        admin_password: password.to_string(),
        ..BootstrapConfig::default()
    }
}

#[tokio::test]
async fn test_creates_super_admin_once() {
    let db = common::setup().await;

    let first = ensure_super_admin(&db, &config("admin123")).await.unwrap();
    let second = ensure_super_admin(&db, &config("admin123")).await.unwrap();

    assert_eq!(first, BootstrapOutcome::Created);
    assert_eq!(second, BootstrapOutcome::Existing);

    let admins = UserRepository::new(db)
        .with_role(Role::SuperAdmin)
        .await
        .unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].email, "superadmin@ams.com");
    assert!(admins[0].password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_skipped_without_password() {
    let db = common::setup().await;
    assert_eq!(
        ensure_super_admin(&db, &config("")).await.unwrap(),
        BootstrapOutcome::Skipped
    );
}

#[tokio::test]
async fn test_short_password_rejected() {
    let db = common::setup().await;
    assert!(ensure_super_admin(&db, &config("abc")).await.is_err());
}
