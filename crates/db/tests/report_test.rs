//! Integration tests for reports and dashboards.

mod common;

use ams_core::Role;
use ams_db::repositories::{NewBill, NewPayment, NewRent, NewTenant, ReportError};
use ams_db::{BillingRepository, RentRepository, ReportRepository, TenantRepository, UserRepository};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
}

#[tokio::test]
async fn test_building_report_balances_collected_against_paid() {
    let db = common::setup().await;
    let building = common::building(&db, "Alpha").await;
    let one = common::user(&db, "one@example.com", &[Role::Owner]).await;
    let two = common::user(&db, "two@example.com", &[Role::Owner]).await;
    common::flat(&db, building.id, "1A", Some(one.id)).await;
    common::flat(&db, building.id, "2A", Some(two.id)).await;

    let billing = BillingRepository::new(db.clone());
    let created = billing
        .create_bill(NewBill {
            building_id: building.id,
            name: "Water".to_string(),
            bill_date: day(1),
            total_amount: dec!(800),
            notes: None,
        })
        .await
        .unwrap();
    let first = created
        .allocations
        .iter()
        .find(|a| a.owner_id == one.id)
        .expect("allocation for first owner");
    billing.mark_allocation_paid(first.id).await.unwrap();
    billing
        .create_payment(NewPayment {
            building_id: building.id,
            bill_id: created.bill.id,
            name: "Water board".to_string(),
            payment_date: day(2),
            amount: dec!(300),
            notes: None,
        })
        .await
        .unwrap();

    let report = ReportRepository::new(db.clone())
        .building_report(building.id)
        .await
        .unwrap();

    assert_eq!(report.totals.total_bills, dec!(800));
    assert_eq!(report.totals.total_collected, dec!(400));
    assert_eq!(report.totals.total_payments, dec!(300));
    assert_eq!(report.balance, dec!(100));
    assert_eq!(report.allocations.len(), 2);

    assert!(matches!(
        ReportRepository::new(db)
            .building_report(Uuid::new_v4())
            .await,
        Err(ReportError::BuildingNotFound)
    ));
}

#[tokio::test]
async fn test_super_admin_dashboard_counts() {
    let db = common::setup().await;
    common::user(&db, "admin@example.com", &[Role::SuperAdmin]).await;
    common::user(&db, "pending@example.com", &[Role::User]).await;
    let owner = common::user(&db, "owner@example.com", &[Role::Owner]).await;
    let alpha = common::building(&db, "Alpha").await;
    let beta = common::building(&db, "Beta").await;
    common::flat(&db, alpha.id, "1A", Some(owner.id)).await;
    common::flat(&db, alpha.id, "1B", None).await;
    UserRepository::new(db.clone())
        .assign_president(owner.id, alpha.id)
        .await
        .unwrap();

    let billing = BillingRepository::new(db.clone());
    let created = billing
        .create_bill(NewBill {
            building_id: alpha.id,
            name: "Security".to_string(),
            bill_date: day(5),
            total_amount: dec!(1200),
            notes: None,
        })
        .await
        .unwrap();
    billing
        .create_payment(NewPayment {
            building_id: alpha.id,
            bill_id: created.bill.id,
            name: "Guard salary".to_string(),
            payment_date: day(6),
            amount: dec!(1000),
            notes: None,
        })
        .await
        .unwrap();

    let dashboard = ReportRepository::new(db.clone())
        .super_admin_dashboard()
        .await
        .unwrap();

    assert_eq!(dashboard.counts.buildings, 2);
    assert_eq!(dashboard.counts.users, 3);
    assert_eq!(dashboard.counts.super_admins, 1);
    assert_eq!(dashboard.counts.presidents, 1);
    assert_eq!(dashboard.counts.owners, 1);
    assert_eq!(dashboard.counts.pending_approvals, 1);
    assert_eq!(dashboard.counts.flats.total, 2);
    assert_eq!(dashboard.counts.flats_with_owner, 1);
    assert_eq!(dashboard.counts.flats_without_owner, 1);

    assert_eq!(dashboard.financials.total_bills_generated, dec!(1200));
    assert_eq!(dashboard.financials.total_payments_made, dec!(1000));
    assert_eq!(dashboard.financials.total_pending, dec!(1200));
    assert_eq!(dashboard.financials.total_collected, dec!(0));
    assert_eq!(dashboard.overall_balance, dec!(-1000));

    assert_eq!(dashboard.recent_bills.len(), 1);
    assert_eq!(dashboard.recent_bills[0].building_name, "Alpha");
    assert_eq!(dashboard.recent_payments.len(), 1);

    let alpha_line = dashboard
        .buildings
        .iter()
        .find(|b| b.id == alpha.id)
        .expect("alpha summary");
    assert_eq!(alpha_line.balance, dec!(200));
    let beta_line = dashboard
        .buildings
        .iter()
        .find(|b| b.id == beta.id)
        .expect("beta summary");
    assert_eq!(beta_line.flats.total, 0);
    assert_eq!(beta_line.balance, dec!(0));
}

#[tokio::test]
async fn test_owner_dashboard() {
    let db = common::setup().await;
    let owner = common::user(&db, "owner@example.com", &[Role::Owner]).await;
    let building = common::building(&db, "Alpha").await;
    let flat = common::flat(&db, building.id, "1A", Some(owner.id)).await;
    common::flat(&db, building.id, "1B", Some(owner.id)).await;

    let tenant = TenantRepository::new(db.clone())
        .create(NewTenant {
            flat_id: flat.id,
            full_name: "Nadia".to_string(),
            email: None,
            phone_number: "01733333333".to_string(),
            is_active: true,
        })
        .await
        .unwrap();
    RentRepository::new(db.clone())
        .create(NewRent {
            tenant_id: tenant.id,
            payment_date: day(3),
            amount: dec!(12000),
            notes: None,
        })
        .await
        .unwrap();
    let billing = BillingRepository::new(db.clone());
    let created = billing
        .create_bill(NewBill {
            building_id: building.id,
            name: "Cleaning".to_string(),
            bill_date: day(4),
            total_amount: dec!(900),
            notes: None,
        })
        .await
        .unwrap();
    billing
        .mark_allocation_paid(created.allocations[0].id)
        .await
        .unwrap();

    let reports = ReportRepository::new(db.clone());
    let dashboard = reports.owner_dashboard(owner.id).await.unwrap();

    assert_eq!(dashboard.owner_name, "owner");
    assert_eq!(dashboard.building_name, "Alpha");
    assert_eq!(dashboard.flats.total, 2);
    assert_eq!(dashboard.flats.vacant, 2);
    assert_eq!(dashboard.financials.bills_paid, dec!(900));
    assert_eq!(dashboard.financials.bills_due, dec!(0));
    assert_eq!(dashboard.financials.rent_collected, dec!(12000));
    assert_eq!(dashboard.balance, dec!(11100));
    assert_eq!(dashboard.rents.len(), 1);
    assert_eq!(dashboard.rents[0].tenant_name, "Nadia");
    assert_eq!(dashboard.rents[0].flat_number, "1A");

    let newcomer = common::user(&db, "new@example.com", &[Role::Owner]).await;
    let empty = reports.owner_dashboard(newcomer.id).await.unwrap();
    assert_eq!(empty.building_name, "N/A");
    assert_eq!(empty.flats.total, 0);
    assert!(empty.allocations.is_empty());
}
