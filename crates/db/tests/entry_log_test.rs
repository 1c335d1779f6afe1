//! Integration tests for the visitor register.

mod common;

use ams_core::entry_log::{EntryLogError as Rule, EntryType};
use ams_core::{BuildingScope, Role};
use ams_db::EntryLogRepository;
use ams_db::repositories::{EntryLogError, NewEntryLog};
use ams_shared::types::PageRequest;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

fn entry(building_id: Uuid, flat_id: Uuid, recorded_by: Uuid, at: DateTime<Utc>) -> NewEntryLog {
    NewEntryLog {
        building_id,
        flat_id,
        visitor_name: "Karim".to_string(),
        phone_number: None,
        entry_type: EntryType::Delivery,
        number_of_persons: 1,
        purpose: "Parcel".to_string(),
        entry_time: at,
        exit_time: None,
        recorded_by,
    }
}

#[tokio::test]
async fn test_entries_listed_latest_first_with_paging() {
    let db = common::setup().await;
    let guard = common::user(&db, "guard@example.com", &[Role::President]).await;
    let building = common::building(&db, "Alpha").await;
    let flat = common::flat(&db, building.id, "1A", None).await;
    let repo = EntryLogRepository::new(db.clone());
    let now = Utc::now();

    for hours in [3, 1, 2] {
        repo.create(
            entry(building.id, flat.id, guard.id, now - Duration::hours(hours)),
            now,
        )
        .await
        .unwrap();
    }

    let page = repo
        .list(
            BuildingScope::Only(building.id),
            PageRequest {
                page: 1,
                per_page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 2);
    assert!(page.data[0].entry.entry_time > page.data[1].entry.entry_time);
    assert_eq!(page.data[0].flat_number, "1A");
    assert_eq!(page.data[0].building_name, "Alpha");

    let rest = repo
        .list(
            BuildingScope::All,
            PageRequest {
                page: 2,
                per_page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(rest.data.len(), 1);

    let none = repo
        .list(BuildingScope::Nothing, PageRequest::default())
        .await
        .unwrap();
    assert!(none.data.is_empty());
    assert_eq!(none.meta.total, 0);
}

#[tokio::test]
async fn test_flat_must_belong_to_building() {
    let db = common::setup().await;
    let guard = common::user(&db, "guard@example.com", &[Role::SuperAdmin]).await;
    let alpha = common::building(&db, "Alpha").await;
    let beta = common::building(&db, "Beta").await;
    let beta_flat = common::flat(&db, beta.id, "1A", None).await;
    let repo = EntryLogRepository::new(db.clone());
    let now = Utc::now();

    assert!(matches!(
        repo.create(entry(alpha.id, beta_flat.id, guard.id, now), now)
            .await,
        Err(EntryLogError::Rule(Rule::FlatNotInBuilding))
    ));
    assert!(matches!(
        repo.create(entry(alpha.id, Uuid::new_v4(), guard.id, now), now)
            .await,
        Err(EntryLogError::FlatNotFound)
    ));
}

#[tokio::test]
async fn test_time_rules_enforced() {
    let db = common::setup().await;
    let guard = common::user(&db, "guard@example.com", &[Role::SuperAdmin]).await;
    let building = common::building(&db, "Alpha").await;
    let flat = common::flat(&db, building.id, "1A", None).await;
    let repo = EntryLogRepository::new(db.clone());
    let now = Utc::now();

    let future = entry(building.id, flat.id, guard.id, now + Duration::minutes(5));
    assert!(matches!(
        repo.create(future, now).await,
        Err(EntryLogError::Rule(Rule::EntryInFuture))
    ));

    let mut early_exit = entry(building.id, flat.id, guard.id, now - Duration::hours(1));
    early_exit.exit_time = Some(now - Duration::hours(2));
    assert!(matches!(
        repo.create(early_exit, now).await,
        Err(EntryLogError::Rule(Rule::ExitNotAfterEntry))
    ));

    let mut visit = entry(building.id, flat.id, guard.id, now - Duration::hours(1));
    visit.exit_time = Some(now);
    visit.entry_type = EntryType::Teacher;
    visit.number_of_persons = 2;
    let saved = repo.create(visit, now).await.unwrap();
    assert_eq!(EntryType::from(saved.entry_type), EntryType::Teacher);
    assert_eq!(saved.recorded_by, Some(guard.id));
}
