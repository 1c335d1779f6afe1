//! Report and dashboard queries.
//!
//! Sums are taken in Rust over `Decimal` values so that results are exact on
//! every backend.

use std::collections::HashMap;

use ams_core::reports::{BuildingTotals, Occupancy, OwnerFinancials, SystemFinancials};
use ams_core::{BuildingScope, Role};
use ams_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use super::billing::{AllocationView, BillingRepository, PaymentView};
use super::user::UserRepository;
use crate::entities::{
    buildings, common_bills, expense_allocations, expense_payments, flats, rents, tenants, users,
};

/// Number of recent bills and payments on the super admin dashboard.
pub const RECENT_ITEMS: u64 = 5;

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// User not found.
    #[error("User not found")]
    UserNotFound,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::BuildingNotFound | ReportError::UserNotFound => {
                Self::NotFound(err.to_string())
            }
            ReportError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Flat counts, with vacancy spelled out for display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OccupancyView {
    /// All flats.
    pub total: u64,
    /// Occupied flats.
    pub occupied: u64,
    /// Vacant flats.
    pub vacant: u64,
}

impl From<Occupancy> for OccupancyView {
    fn from(o: Occupancy) -> Self {
        Self {
            total: o.total,
            occupied: o.occupied,
            vacant: o.vacant(),
        }
    }
}

/// A president's building report.
#[derive(Debug, Clone, Serialize)]
pub struct BuildingReport {
    /// Building.
    pub building: buildings::Model,
    /// Money totals.
    #[serde(flatten)]
    pub totals: BuildingTotals,
    /// Collected minus paid out.
    pub balance: Decimal,
    /// Every allocation of the building's bills.
    pub allocations: Vec<AllocationView>,
}

/// Headcounts for the super admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SystemCounts {
    /// Buildings.
    pub buildings: u64,
    /// User accounts.
    pub users: u64,
    /// Super admins.
    pub super_admins: u64,
    /// Presidents.
    pub presidents: u64,
    /// Owners.
    pub owners: u64,
    /// Accounts waiting for owner approval.
    pub pending_approvals: u64,
    /// Tenants.
    pub tenants: u64,
    /// Flat occupancy.
    pub flats: OccupancyView,
    /// Flats with an owner.
    pub flats_with_owner: u64,
    /// Flats without an owner.
    pub flats_without_owner: u64,
}

/// Bill row with its building name.
#[derive(Debug, Clone, Serialize)]
pub struct RecentBill {
    /// Bill.
    #[serde(flatten)]
    pub bill: common_bills::Model,
    /// Building name.
    pub building_name: String,
}

/// Per-building line of the super admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BuildingSummary {
    /// Building ID.
    pub id: Uuid,
    /// Building name.
    pub name: String,
    /// Flat occupancy.
    pub flats: OccupancyView,
    /// Sum of bill totals.
    pub total_bills: Decimal,
    /// Sum of expense payments.
    pub total_payments: Decimal,
    /// Bills minus payments.
    pub balance: Decimal,
}

/// Super admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SuperAdminDashboard {
    /// Headcounts.
    pub counts: SystemCounts,
    /// Money totals.
    pub financials: SystemFinancials,
    /// Collected minus paid out.
    pub overall_balance: Decimal,
    /// Latest bills.
    pub recent_bills: Vec<RecentBill>,
    /// Latest expense payments.
    pub recent_payments: Vec<PaymentView>,
    /// One line per building.
    pub buildings: Vec<BuildingSummary>,
}

/// Rent row for the owner dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRent {
    /// Rent record.
    #[serde(flatten)]
    pub rent: rents::Model,
    /// Tenant name.
    pub tenant_name: String,
    /// Flat number.
    pub flat_number: String,
}

/// Owner dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerDashboard {
    /// Owner name.
    pub owner_name: String,
    /// Building of the owner's first flat, or "N/A".
    pub building_name: String,
    /// Address of that building, or "N/A".
    pub building_address: String,
    /// Owned flats.
    pub flats: OccupancyView,
    /// Money totals.
    #[serde(flatten)]
    pub financials: OwnerFinancials,
    /// Rent collected minus bills paid.
    pub balance: Decimal,
    /// Allocations billed to the owner.
    pub allocations: Vec<AllocationView>,
    /// Rent received, newest first.
    pub rents: Vec<OwnerRent>,
}

const NOT_AVAILABLE: &str = "N/A";

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Money totals and allocations for one building.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::BuildingNotFound` if there is no such building.
    pub async fn building_report(&self, building_id: Uuid) -> Result<BuildingReport, ReportError> {
        let building = buildings::Entity::find_by_id(building_id)
            .one(&self.db)
            .await?
            .ok_or(ReportError::BuildingNotFound)?;

        let bills = common_bills::Entity::find()
            .filter(common_bills::Column::BuildingId.eq(building_id))
            .all(&self.db)
            .await?;
        let bill_ids: Vec<Uuid> = bills.iter().map(|b| b.id).collect();

        let total_collected = expense_allocations::Entity::find()
            .filter(expense_allocations::Column::BillId.is_in(bill_ids))
            .filter(expense_allocations::Column::IsPaid.eq(true))
            .all(&self.db)
            .await?
            .iter()
            .map(|a| a.amount_due)
            .sum();
        let total_payments = expense_payments::Entity::find()
            .filter(expense_payments::Column::BuildingId.eq(building_id))
            .all(&self.db)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        let totals = BuildingTotals {
            total_bills: bills.iter().map(|b| b.total_amount).sum(),
            total_collected,
            total_payments,
        };
        let allocations = BillingRepository::new(self.db.clone())
            .list_allocations(BuildingScope::Only(building_id))
            .await?;

        Ok(BuildingReport {
            building,
            balance: totals.balance(),
            totals,
            allocations,
        })
    }

    /// System-wide counts, money totals, and per-building summaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn super_admin_dashboard(&self) -> Result<SuperAdminDashboard, ReportError> {
        let users_repo = UserRepository::new(self.db.clone());

        let all_flats = flats::Entity::find().all(&self.db).await?;
        let with_owner = all_flats.iter().filter(|f| f.owner_id.is_some()).count() as u64;
        let occupancy = Occupancy {
            total: all_flats.len() as u64,
            occupied: all_flats.iter().filter(|f| f.is_occupied).count() as u64,
        };

        let counts = SystemCounts {
            buildings: buildings::Entity::find().count(&self.db).await?,
            users: users::Entity::find().count(&self.db).await?,
            super_admins: users_repo.with_role(Role::SuperAdmin).await?.len() as u64,
            presidents: users_repo.with_role(Role::President).await?.len() as u64,
            owners: users_repo.with_role(Role::Owner).await?.len() as u64,
            pending_approvals: users_repo.pending_owners().await?.len() as u64,
            tenants: tenants::Entity::find().count(&self.db).await?,
            flats: occupancy.into(),
            flats_with_owner: with_owner,
            flats_without_owner: occupancy.total - with_owner,
        };

        let bills = common_bills::Entity::find().all(&self.db).await?;
        let payments = expense_payments::Entity::find().all(&self.db).await?;
        let allocations = expense_allocations::Entity::find().all(&self.db).await?;

        let financials = SystemFinancials {
            total_bills_generated: bills.iter().map(|b| b.total_amount).sum(),
            total_payments_made: payments.iter().map(|p| p.amount).sum(),
            total_collected: allocations
                .iter()
                .filter(|a| a.is_paid)
                .map(|a| a.amount_due)
                .sum(),
            total_pending: allocations
                .iter()
                .filter(|a| !a.is_paid)
                .map(|a| a.amount_due)
                .sum(),
        };

        let buildings = buildings::Entity::find()
            .order_by_asc(buildings::Column::Name)
            .all(&self.db)
            .await?;
        let names: HashMap<Uuid, String> =
            buildings.iter().map(|b| (b.id, b.name.clone())).collect();

        let summaries = buildings
            .iter()
            .map(|b| {
                let own: Vec<&flats::Model> =
                    all_flats.iter().filter(|f| f.building_id == b.id).collect();
                let total_bills: Decimal = bills
                    .iter()
                    .filter(|x| x.building_id == b.id)
                    .map(|x| x.total_amount)
                    .sum();
                let total_payments: Decimal = payments
                    .iter()
                    .filter(|x| x.building_id == b.id)
                    .map(|x| x.amount)
                    .sum();
                BuildingSummary {
                    id: b.id,
                    name: b.name.clone(),
                    flats: Occupancy {
                        total: own.len() as u64,
                        occupied: own.iter().filter(|f| f.is_occupied).count() as u64,
                    }
                    .into(),
                    total_bills,
                    total_payments,
                    balance: total_bills - total_payments,
                }
            })
            .collect();

        let recent_bills = common_bills::Entity::find()
            .order_by_desc(common_bills::Column::BillDate)
            .order_by_desc(common_bills::Column::CreatedAt)
            .limit(RECENT_ITEMS)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|bill| RecentBill {
                building_name: names.get(&bill.building_id).cloned().unwrap_or_default(),
                bill,
            })
            .collect();
        let recent_payments = BillingRepository::new(self.db.clone())
            .list_payments(BuildingScope::All)
            .await?
            .into_iter()
            .take(usize::try_from(RECENT_ITEMS).unwrap_or(usize::MAX))
            .collect();

        Ok(SuperAdminDashboard {
            counts,
            overall_balance: financials.overall_balance(),
            financials,
            recent_bills,
            recent_payments,
            buildings: summaries,
        })
    }

    /// An owner's flats, bills, and rent income.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::UserNotFound` if there is no such user.
    pub async fn owner_dashboard(&self, owner_id: Uuid) -> Result<OwnerDashboard, ReportError> {
        let owner = users::Entity::find_by_id(owner_id)
            .one(&self.db)
            .await?
            .ok_or(ReportError::UserNotFound)?;

        let owned = flats::Entity::find()
            .filter(flats::Column::OwnerId.eq(owner_id))
            .order_by_asc(flats::Column::FlatNumber)
            .all(&self.db)
            .await?;
        let occupancy = Occupancy {
            total: owned.len() as u64,
            occupied: owned.iter().filter(|f| f.is_occupied).count() as u64,
        };

        let building = match owned.first() {
            Some(flat) => {
                buildings::Entity::find_by_id(flat.building_id)
                    .one(&self.db)
                    .await?
            }
            None => None,
        };

        let allocations = BillingRepository::new(self.db.clone())
            .list_allocations_for_owner(owner_id)
            .await?;

        let flat_numbers: HashMap<Uuid, String> = owned
            .iter()
            .map(|f| (f.id, f.flat_number.clone()))
            .collect();
        let tenants: HashMap<Uuid, tenants::Model> = tenants::Entity::find()
            .filter(tenants::Column::FlatId.is_in(flat_numbers.keys().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let rents: Vec<OwnerRent> = rents::Entity::find()
            .filter(rents::Column::TenantId.is_in(tenants.keys().copied().collect::<Vec<_>>()))
            .order_by_desc(rents::Column::PaymentDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|rent| {
                let tenant = tenants.get(&rent.tenant_id);
                OwnerRent {
                    tenant_name: tenant.map(|t| t.full_name.clone()).unwrap_or_default(),
                    flat_number: tenant
                        .and_then(|t| flat_numbers.get(&t.flat_id))
                        .cloned()
                        .unwrap_or_default(),
                    rent,
                }
            })
            .collect();

        let financials = OwnerFinancials {
            bills_due: allocations
                .iter()
                .filter(|a| !a.allocation.is_paid)
                .map(|a| a.allocation.amount_due)
                .sum(),
            bills_paid: allocations
                .iter()
                .filter(|a| a.allocation.is_paid)
                .map(|a| a.allocation.amount_due)
                .sum(),
            rent_collected: rents.iter().map(|r| r.rent.amount).sum(),
        };

        Ok(OwnerDashboard {
            owner_name: owner.full_name,
            building_name: building
                .as_ref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |b| b.name.clone()),
            building_address: building
                .and_then(|b| b.address)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            flats: occupancy.into(),
            balance: financials.balance(),
            financials,
            allocations,
            rents,
        })
    }
}
