//! Database seeder for local development and demos.
//!
//! Seeds a super admin, two buildings with a president each, owners with
//! flats and tenants, and a month of bills, payments, expenses, and gate
//! entries. Running it twice is a no-op.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use ams_core::Role;
use ams_core::auth::hash_password;
use ams_core::entry_log::EntryType;
use ams_db::repositories::{
    BuildingInput, ExpenseInput, NewBill, NewEntryLog, NewPayment, NewRent, NewTenant, NewUser,
};
use ams_db::{
    BillingRepository, BuildingRepository, EntryLogRepository, ExpenseRepository, FlatRepository,
    RentRepository, TenantRepository, UserRepository,
};

/// Password shared by every seeded account.
const DEMO_PASSWORD: &str = "password123";
const ADMIN_EMAIL: &str = "superadmin@ams.com";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    if UserRepository::new(db.clone()).email_exists(ADMIN_EMAIL).await? {
        println!("  Demo data already present, skipping...");
        return Ok(());
    }

    println!("Seeding users...");
    let admin = seed_user(&db, ADMIN_EMAIL, "Super Admin", &[Role::SuperAdmin]).await?;

    println!("Seeding buildings...");
    let buildings = BuildingRepository::new(db.clone());
    let mut seeded = Vec::new();
    for (name, address) in [
        ("Lakeview Tower", "12 Lake Road, Dhanmondi"),
        ("Green Court", "7 Park Avenue, Gulshan"),
    ] {
        let building = buildings
            .create(BuildingInput {
                name: name.to_string(),
                address: Some(address.to_string()),
            })
            .await?;
        seeded.push(building.id);
    }

    for (index, building_id) in seeded.into_iter().enumerate() {
        seed_building(&db, building_id, index + 1, admin).await?;
    }

    println!("Seeding pending registration...");
    seed_user(&db, "applicant@ams.com", "Pending Applicant", &[Role::User]).await?;

    println!("Seeding complete! Every account uses the password '{DEMO_PASSWORD}'.");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    roles: &[Role],
) -> Result<Uuid> {
    let user = UserRepository::new(db.clone())
        .create(NewUser {
            email: email.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            full_name: full_name.to_string(),
            phone_number: None,
            roles: roles.to_vec(),
        })
        .await?;
    println!("  {email} ({roles:?})");
    Ok(user.id)
}

/// Fills one building: a president, three owners, six flats, and activity.
async fn seed_building(
    db: &DatabaseConnection,
    building_id: Uuid,
    n: usize,
    recorded_by: Uuid,
) -> Result<()> {
    let president = seed_user(
        db,
        &format!("president{n}@ams.com"),
        &format!("President {n}"),
        &[Role::Owner],
    )
    .await?;
    UserRepository::new(db.clone())
        .assign_president(president, building_id)
        .await?;

    let mut owners = vec![president];
    for i in 1..=2 {
        owners.push(
            seed_user(
                db,
                &format!("owner{n}{i}@ams.com"),
                &format!("Owner {n}-{i}"),
                &[Role::Owner],
            )
            .await?,
        );
    }

    println!("  Seeding flats...");
    let flats = FlatRepository::new(db.clone());
    let mut flat_ids = Vec::new();
    for (i, number) in ["1A", "1B", "2A", "2B", "3A", "3B"].into_iter().enumerate() {
        let flat = flats.create(building_id, number, i % 2 == 0).await?;
        // The last flat stays unsold.
        if let Some(owner) = owners.get(i / 2).filter(|_| i < 5) {
            flats.assign_owner(flat.id, *owner).await?;
        }
        flat_ids.push(flat.id);
    }

    println!("  Seeding tenants and rent...");
    let first_of_month = NaiveDate::from_ymd_opt(2026, 1, 1).context("invalid seed date")?;
    let tenant = TenantRepository::new(db.clone())
        .create(NewTenant {
            flat_id: flat_ids[0],
            full_name: format!("Tenant {n}"),
            email: None,
            phone_number: format!("0170000000{n}"),
            is_active: true,
        })
        .await?;
    RentRepository::new(db.clone())
        .create(NewRent {
            tenant_id: tenant.id,
            payment_date: first_of_month + Duration::days(4),
            amount: Decimal::new(18_000, 0),
            notes: Some("January rent".to_string()),
        })
        .await?;

    println!("  Seeding bills and payments...");
    let billing = BillingRepository::new(db.clone());
    let bill = billing
        .create_bill(NewBill {
            building_id,
            name: "Lift maintenance".to_string(),
            bill_date: first_of_month,
            total_amount: Decimal::new(1_000_000, 2),
            notes: None,
        })
        .await?;
    billing
        .create_payment(NewPayment {
            building_id,
            bill_id: bill.bill.id,
            name: "Lift vendor".to_string(),
            payment_date: first_of_month + Duration::days(10),
            amount: Decimal::new(400_000, 2),
            notes: Some("First instalment".to_string()),
        })
        .await?;
    if let Some(allocation) = bill.allocations.first() {
        billing.mark_allocation_paid(allocation.id).await?;
    }

    ExpenseRepository::new(db.clone())
        .create(
            building_id,
            ExpenseInput {
                name: "Generator fuel".to_string(),
                expense_date: first_of_month + Duration::days(15),
                amount: Decimal::new(350_050, 2),
                notes: None,
            },
        )
        .await?;

    println!("  Seeding entry log...");
    let now = Utc::now();
    let entries = EntryLogRepository::new(db.clone());
    for (hours_ago, entry_type, visitor) in [
        (30, EntryType::Delivery, "Courier"),
        (6, EntryType::Visitor, "Family guest"),
        (2, EntryType::Maintenance, "Plumber"),
    ] {
        let entry_time = now - Duration::hours(hours_ago);
        entries
            .create(
                NewEntryLog {
                    building_id,
                    flat_id: flat_ids[1],
                    visitor_name: visitor.to_string(),
                    phone_number: None,
                    entry_type,
                    number_of_persons: 1,
                    purpose: format!("{entry_type:?} visit"),
                    entry_time,
                    exit_time: Some(entry_time + Duration::hours(1)),
                    recorded_by,
                },
                now,
            )
            .await?;
    }

    Ok(())
}
