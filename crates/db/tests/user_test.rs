//! Integration tests for the user repository.

mod common;

use ams_core::Role;
use ams_db::UserRepository;
use ams_db::repositories::{NewUser, UserError};

#[tokio::test]
async fn test_create_stores_lowercased_email_and_roles() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());

    let user = repo
        .create(NewUser {
            email: "  Rafi@Example.COM ".to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            full_name: "Rafi".to_string(),
            phone_number: Some("01700000000".to_string()),
            roles: vec![Role::Owner, Role::President, Role::Owner],
        })
        .await
        .expect("Failed to create user");

    assert_eq!(user.email, "rafi@example.com");
    assert!(user.is_active);
    assert_eq!(
        repo.roles_of(user.id).await.unwrap(),
        vec![Role::President, Role::Owner]
    );

    let found = repo
        .find_by_email("RAFI@example.com")
        .await
        .unwrap()
        .expect("User should exist");
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let db = common::setup().await;
    common::user(&db, "dup@example.com", &[Role::User]).await;

    let result = UserRepository::new(db)
        .create(NewUser {
            email: "DUP@example.com".to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            full_name: "Dup".to_string(),
            phone_number: None,
            roles: vec![Role::User],
        })
        .await;

    assert!(matches!(result, Err(UserError::EmailTaken)));
}

#[tokio::test]
async fn test_approve_owner_keeps_user_role_and_clears_pending() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());
    let applicant = common::user(&db, "applicant@example.com", &[Role::User]).await;
    common::user(&db, "owner@example.com", &[Role::User, Role::Owner]).await;

    let pending = repo.pending_owners().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, applicant.id);

    repo.add_role(applicant.id, Role::Owner).await.unwrap();
    // Granting twice is a no-op.
    repo.add_role(applicant.id, Role::Owner).await.unwrap();

    assert!(repo.pending_owners().await.unwrap().is_empty());
    assert_eq!(
        repo.roles_of(applicant.id).await.unwrap(),
        vec![Role::Owner, Role::User]
    );
}

#[tokio::test]
async fn test_add_role_to_missing_user() {
    let db = common::setup().await;
    let result = UserRepository::new(db)
        .add_role(uuid::Uuid::new_v4(), Role::Owner)
        .await;
    assert!(matches!(result, Err(UserError::NotFound)));
}

#[tokio::test]
async fn test_load_principal_carries_building_and_roles() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());
    let building = common::building(&db, "Green Tower").await;
    let owner = common::user(&db, "owner@example.com", &[Role::Owner]).await;

    repo.assign_president(owner.id, building.id).await.unwrap();

    let principal = repo
        .load_principal(owner.id)
        .await
        .unwrap()
        .expect("Principal should load");
    assert_eq!(principal.building_id, Some(building.id));
    assert!(principal.has_role(Role::President));
    assert!(principal.has_role(Role::Owner));

    assert!(
        repo.load_principal(uuid::Uuid::new_v4())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_assign_president_rules() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());
    let building = common::building(&db, "Green Tower").await;
    let plain = common::user(&db, "plain@example.com", &[Role::User]).await;
    let first = common::user(&db, "first@example.com", &[Role::Owner]).await;
    let second = common::user(&db, "second@example.com", &[Role::Owner]).await;

    assert!(matches!(
        repo.assign_president(plain.id, building.id).await,
        Err(UserError::NotAnOwner)
    ));
    assert!(matches!(
        repo.assign_president(first.id, uuid::Uuid::new_v4()).await,
        Err(UserError::BuildingNotFound)
    ));

    repo.assign_president(first.id, building.id).await.unwrap();

    assert!(matches!(
        repo.assign_president(first.id, building.id).await,
        Err(UserError::AlreadyPresident)
    ));
    assert!(matches!(
        repo.assign_president(second.id, building.id).await,
        Err(UserError::BuildingHasPresident)
    ));

    let presidents = repo.with_role(Role::President).await.unwrap();
    assert_eq!(presidents.len(), 1);
    assert_eq!(presidents[0].id, first.id);
}

#[tokio::test]
async fn test_list_summaries_excludes_caller_and_counts_flats() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());
    let admin = common::user(&db, "admin@example.com", &[Role::SuperAdmin]).await;
    let owner = common::user(&db, "owner@example.com", &[Role::Owner]).await;
    let building = common::building(&db, "Green Tower").await;
    common::flat(&db, building.id, "1A", Some(owner.id)).await;
    common::flat(&db, building.id, "1B", Some(owner.id)).await;

    let summaries = repo.list_summaries(admin.id).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, owner.id);
    assert_eq!(summaries[0].flat_count, 2);
    assert_eq!(summaries[0].outstanding_bills, 0);
    assert_eq!(summaries[0].roles, vec![Role::Owner]);
}
