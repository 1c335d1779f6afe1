//! Billing repository: common bills, owner allocations, and expense payments.
//!
//! A bill is split across the owners of flats in its building when it is
//! created. Owners settle their allocation; the president records outgoing
//! expense payments against the bill until it is fully paid out.

use std::collections::{BTreeMap, HashMap};

use ams_core::BuildingScope;
use ams_core::billing::{OwnerShare, check_payment, outstanding_label, split_by_flat_count};
use ams_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::vanished_as;
use crate::entities::{
    buildings, common_bills, expense_allocations, expense_payments, flats, users,
};

/// Error types for billing operations.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Bill not found.
    #[error("Bill not found")]
    NotFound,

    /// Allocation not found.
    #[error("Allocation not found")]
    AllocationNotFound,

    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// The bill belongs to another building.
    #[error("Selected bill does not belong to this building")]
    BillNotInBuilding,

    /// Amount or balance rule broken.
    #[error(transparent)]
    Rule(#[from] ams_core::billing::BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::NotFound
            | BillingError::AllocationNotFound
            | BillingError::BuildingNotFound => Self::NotFound(err.to_string()),
            BillingError::BillNotInBuilding => Self::Validation(err.to_string()),
            BillingError::Rule(rule) => rule.into(),
            BillingError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a common bill.
#[derive(Debug, Clone)]
pub struct NewBill {
    /// Billed building.
    pub building_id: Uuid,
    /// Bill name, e.g. "Lift maintenance March".
    pub name: String,
    /// Bill date.
    pub bill_date: NaiveDate,
    /// Total to split across owners.
    pub total_amount: Decimal,
    /// Free text.
    pub notes: Option<String>,
}

/// A freshly created bill and the allocations generated for it.
#[derive(Debug, Clone, Serialize)]
pub struct BillWithAllocations {
    /// Bill record.
    pub bill: common_bills::Model,
    /// One allocation per owner of a flat in the building.
    pub allocations: Vec<expense_allocations::Model>,
}

/// Allocation row with bill and owner names.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationView {
    /// Allocation record.
    #[serde(flatten)]
    pub allocation: expense_allocations::Model,
    /// Bill name.
    pub bill_name: String,
    /// Bill date.
    pub bill_date: NaiveDate,
    /// Building of the bill.
    pub building_id: Uuid,
    /// Owner display name.
    pub owner_name: String,
}

/// Expense payment row with bill name.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    /// Payment record.
    #[serde(flatten)]
    pub payment: expense_payments::Model,
    /// Bill name.
    pub bill_name: String,
}

/// Bill that still has money left to pay out.
#[derive(Debug, Clone, Serialize)]
pub struct OutstandingBill {
    /// Bill ID.
    pub id: Uuid,
    /// Bill name.
    pub name: String,
    /// Bill total.
    pub total_amount: Decimal,
    /// Payments recorded so far.
    pub paid: Decimal,
    /// Total minus paid.
    pub outstanding: Decimal,
    /// Dropdown label.
    pub label: String,
}

/// Input for recording an expense payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Building paying.
    pub building_id: Uuid,
    /// Bill paid against.
    pub bill_id: Uuid,
    /// Payment name.
    pub name: String,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Amount paid out.
    pub amount: Decimal,
    /// Free text.
    pub notes: Option<String>,
}

/// Billing repository.
#[derive(Debug, Clone)]
pub struct BillingRepository {
    db: DatabaseConnection,
}

fn scoped<E, C>(query: Select<E>, column: C, scope: BuildingScope) -> Option<Select<E>>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match scope {
        BuildingScope::All => Some(query),
        BuildingScope::Only(id) => Some(query.filter(column.eq(id))),
        BuildingScope::Nothing => None,
    }
}

async fn paid_against<C: ConnectionTrait>(conn: &C, bill_id: Uuid) -> Result<Decimal, DbErr> {
    Ok(expense_payments::Entity::find()
        .filter(expense_payments::Column::BillId.eq(bill_id))
        .all(conn)
        .await?
        .iter()
        .map(|p| p.amount)
        .sum())
}

impl BillingRepository {
    /// Creates a new billing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Bills visible under `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_bills(&self, scope: BuildingScope) -> Result<Vec<common_bills::Model>, DbErr> {
        let query = common_bills::Entity::find()
            .order_by_desc(common_bills::Column::BillDate)
            .order_by_desc(common_bills::Column::CreatedAt);
        match scoped(query, common_bills::Column::BuildingId, scope) {
            Some(q) => q.all(&self.db).await,
            None => Ok(Vec::new()),
        }
    }

    /// Loads a bill.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotFound` if there is no such bill.
    pub async fn get_bill(&self, id: Uuid) -> Result<common_bills::Model, BillingError> {
        common_bills::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BillingError::NotFound)
    }

    /// Creates a bill and splits it across the building's flat owners.
    ///
    /// Each owner's share is proportional to the number of flats they own in
    /// this building. A building without owned flats gets a bill with no
    /// allocations.
    ///
    /// # Errors
    ///
    /// Returns `BuildingNotFound` or a `Rule` error for a non-positive total.
    pub async fn create_bill(&self, input: NewBill) -> Result<BillWithAllocations, BillingError> {
        let txn = self.db.begin().await?;

        if buildings::Entity::find_by_id(input.building_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(BillingError::BuildingNotFound);
        }

        // BTreeMap keeps allocation order stable across runs.
        let mut counts: BTreeMap<Uuid, u32> = BTreeMap::new();
        for flat in flats::Entity::find()
            .filter(flats::Column::BuildingId.eq(input.building_id))
            .filter(flats::Column::OwnerId.is_not_null())
            .all(&txn)
            .await?
        {
            if let Some(owner) = flat.owner_id {
                *counts.entry(owner).or_default() += 1;
            }
        }
        let owners: Vec<OwnerShare> = counts
            .into_iter()
            .map(|(owner_id, flat_count)| OwnerShare {
                owner_id,
                flat_count,
            })
            .collect();
        let shares = split_by_flat_count(input.total_amount, &owners)?;

        let bill = common_bills::ActiveModel {
            id: Set(Uuid::new_v4()),
            building_id: Set(input.building_id),
            name: Set(input.name),
            bill_date: Set(input.bill_date),
            total_amount: Set(input.total_amount),
            notes: Set(input.notes),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut allocations = Vec::with_capacity(shares.len());
        for share in shares {
            let allocation = expense_allocations::ActiveModel {
                id: Set(Uuid::new_v4()),
                bill_id: Set(bill.id),
                owner_id: Set(share.owner_id),
                amount_due: Set(share.amount_due),
                is_paid: Set(false),
                payment_date: Set(None),
            }
            .insert(&txn)
            .await?;
            allocations.push(allocation);
        }

        txn.commit().await?;
        tracing::info!(
            bill_id = %bill.id,
            building_id = %bill.building_id,
            total = %bill.total_amount,
            owners = allocations.len(),
            "Bill created and allocated"
        );

        Ok(BillWithAllocations { bill, allocations })
    }

    /// Allocations of bills visible under `scope`, newest bill first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_allocations(&self, scope: BuildingScope) -> Result<Vec<AllocationView>, DbErr> {
        let bills = self.list_bills(scope).await?;
        self.allocations_of_bills(&bills, None).await
    }

    /// Allocations billed to one owner, newest bill first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_allocations_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<AllocationView>, DbErr> {
        let bill_ids: Vec<Uuid> = expense_allocations::Entity::find()
            .filter(expense_allocations::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| a.bill_id)
            .collect();
        let bills = common_bills::Entity::find()
            .filter(common_bills::Column::Id.is_in(bill_ids))
            .order_by_desc(common_bills::Column::BillDate)
            .order_by_desc(common_bills::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.allocations_of_bills(&bills, Some(owner_id)).await
    }

    async fn allocations_of_bills(
        &self,
        bills: &[common_bills::Model],
        owner: Option<Uuid>,
    ) -> Result<Vec<AllocationView>, DbErr> {
        let mut query = expense_allocations::Entity::find().filter(
            expense_allocations::Column::BillId.is_in(bills.iter().map(|b| b.id).collect::<Vec<_>>()),
        );
        if let Some(owner_id) = owner {
            query = query.filter(expense_allocations::Column::OwnerId.eq(owner_id));
        }
        let mut by_bill: HashMap<Uuid, Vec<(expense_allocations::Model, Option<users::Model>)>> =
            HashMap::new();
        for (allocation, user) in query
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?
        {
            by_bill
                .entry(allocation.bill_id)
                .or_default()
                .push((allocation, user));
        }

        let mut views = Vec::new();
        for bill in bills {
            let mut rows = by_bill.remove(&bill.id).unwrap_or_default();
            rows.sort_by(|a, b| {
                let an = a.1.as_ref().map(|u| u.full_name.as_str());
                let bn = b.1.as_ref().map(|u| u.full_name.as_str());
                an.cmp(&bn)
            });
            views.extend(rows.into_iter().map(|(allocation, user)| AllocationView {
                allocation,
                bill_name: bill.name.clone(),
                bill_date: bill.bill_date,
                building_id: bill.building_id,
                owner_name: user.map(|u| u.full_name).unwrap_or_default(),
            }));
        }
        Ok(views)
    }

    /// Loads an allocation with its bill.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::AllocationNotFound` if either is missing.
    pub async fn get_allocation(
        &self,
        id: Uuid,
    ) -> Result<(expense_allocations::Model, common_bills::Model), BillingError> {
        match expense_allocations::Entity::find_by_id(id)
            .find_also_related(common_bills::Entity)
            .one(&self.db)
            .await?
        {
            Some((allocation, Some(bill))) => Ok((allocation, bill)),
            _ => Err(BillingError::AllocationNotFound),
        }
    }

    /// Marks an owner's allocation as paid now.
    ///
    /// An allocation that is already paid keeps its original payment date.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::AllocationNotFound` if it is gone.
    pub async fn mark_allocation_paid(
        &self,
        id: Uuid,
    ) -> Result<expense_allocations::Model, BillingError> {
        let (allocation, _) = self.get_allocation(id).await?;
        if allocation.is_paid {
            return Ok(allocation);
        }

        let mut active: expense_allocations::ActiveModel = allocation.into();
        active.is_paid = Set(true);
        active.payment_date = Set(Some(chrono::Utc::now().into()));
        let allocation = active
            .update(&self.db)
            .await
            .map_err(|e| vanished_as(e, BillingError::AllocationNotFound))?;

        tracing::info!(allocation_id = %id, owner_id = %allocation.owner_id, "Allocation paid");
        Ok(allocation)
    }

    /// Expense payments visible under `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payments(&self, scope: BuildingScope) -> Result<Vec<PaymentView>, DbErr> {
        let query = expense_payments::Entity::find()
            .order_by_desc(expense_payments::Column::PaymentDate)
            .order_by_desc(expense_payments::Column::CreatedAt);
        let Some(query) = scoped(query, expense_payments::Column::BuildingId, scope) else {
            return Ok(Vec::new());
        };

        Ok(query
            .find_also_related(common_bills::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(payment, bill)| PaymentView {
                payment,
                bill_name: bill.map(|b| b.name).unwrap_or_default(),
            })
            .collect())
    }

    /// Bills of a building that are not fully paid out, for the payment form.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn outstanding_bills(&self, building_id: Uuid) -> Result<Vec<OutstandingBill>, DbErr> {
        let bills = self.list_bills(BuildingScope::Only(building_id)).await?;
        let mut paid: HashMap<Uuid, Decimal> = HashMap::new();
        for p in expense_payments::Entity::find()
            .filter(expense_payments::Column::BuildingId.eq(building_id))
            .all(&self.db)
            .await?
        {
            *paid.entry(p.bill_id).or_default() += p.amount;
        }

        Ok(bills
            .into_iter()
            .filter_map(|bill| {
                let paid = paid.get(&bill.id).copied().unwrap_or_default();
                let outstanding = bill.total_amount - paid;
                (outstanding > Decimal::ZERO).then(|| OutstandingBill {
                    label: outstanding_label(&bill.name, outstanding),
                    id: bill.id,
                    name: bill.name,
                    total_amount: bill.total_amount,
                    paid,
                    outstanding,
                })
            })
            .collect())
    }

    /// Records an expense payment against a bill.
    ///
    /// The remaining balance is recomputed from the recorded payments inside
    /// the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `BillNotInBuilding`, or a `Rule` error when the
    /// amount is not positive or exceeds the remaining balance.
    pub async fn create_payment(
        &self,
        input: NewPayment,
    ) -> Result<expense_payments::Model, BillingError> {
        let txn = self.db.begin().await?;

        let bill = common_bills::Entity::find_by_id(input.bill_id)
            .one(&txn)
            .await?
            .ok_or(BillingError::NotFound)?;
        if bill.building_id != input.building_id {
            return Err(BillingError::BillNotInBuilding);
        }

        let paid = paid_against(&txn, bill.id).await?;
        let remaining = check_payment(bill.total_amount, paid, input.amount)?;

        let payment = expense_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            building_id: Set(input.building_id),
            bill_id: Set(input.bill_id),
            name: Set(input.name),
            payment_date: Set(input.payment_date),
            amount: Set(input.amount),
            notes: Set(input.notes),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(
            payment_id = %payment.id,
            bill_id = %bill.id,
            amount = %payment.amount,
            remaining = %remaining,
            "Expense payment recorded"
        );

        Ok(payment)
    }
}
