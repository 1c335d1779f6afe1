//! Common bill, allocation, and expense payment routes.
//!
//! Everything here is building management: super admins act on any
//! building, presidents on their own.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::{cents, not_blank};
use ams_db::{
    BillingRepository,
    entities::{common_bills, expense_allocations, expense_payments},
    repositories::{
        AllocationView, BillWithAllocations, NewBill, NewPayment, OutstandingBill, PaymentView,
    },
};

/// Creates the billing routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bills", get(list_bills))
        .route("/bills/{bill_id}", get(get_bill))
        .route("/buildings/{building_id}/bills", post(create_bill))
        .route("/allocations", get(list_allocations))
        .route("/allocations/{allocation_id}/pay", post(mark_allocation_paid))
        .route("/payments", get(list_payments))
        .route(
            "/buildings/{building_id}/outstanding-bills",
            get(outstanding_bills),
        )
        .route("/buildings/{building_id}/payments", post(create_payment))
}

/// Request body for a new common bill.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    /// Bill name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Bill name is required (max 100 characters)"))]
    pub name: String,
    /// Bill date.
    pub bill_date: NaiveDate,
    /// Total to split across owners; must be positive.
    #[validate(custom(function = "cents"))]
    pub total_amount: Decimal,
    /// Free text.
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// Request body for an expense payment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    /// Bill paid against; must belong to the building.
    pub bill_id: Uuid,
    /// Payment name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Payment name is required (max 100 characters)"))]
    pub name: String,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Amount paid out; positive and no more than what is left on the bill.
    #[validate(custom(function = "cents"))]
    pub amount: Decimal,
    /// Free text.
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// GET /bills - Bills of the buildings the caller manages, newest first.
async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<common_bills::Model>>> {
    let scope = user.managed_scope()?;
    Ok(Json(
        BillingRepository::new(state.conn())
            .list_bills(scope)
            .await?,
    ))
}

/// GET /bills/{bill_id} - One bill.
async fn get_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(bill_id): Path<Uuid>,
) -> ApiResult<Json<common_bills::Model>> {
    let bill = BillingRepository::new(state.conn())
        .get_bill(bill_id)
        .await?;
    user.ensure_manages_building(bill.building_id)?;
    Ok(Json(bill))
}

/// POST /buildings/{building_id}/bills - Create a bill and allocate it.
async fn create_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateBillRequest>,
) -> ApiResult<(StatusCode, Json<BillWithAllocations>)> {
    user.ensure_manages_building(building_id)?;
    let created = BillingRepository::new(state.conn())
        .create_bill(NewBill {
            building_id,
            name: payload.name.trim().to_string(),
            bill_date: payload.bill_date,
            total_amount: payload.total_amount,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /allocations - Owner shares of the caller's bills.
async fn list_allocations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<AllocationView>>> {
    let scope = user.managed_scope()?;
    Ok(Json(
        BillingRepository::new(state.conn())
            .list_allocations(scope)
            .await?,
    ))
}

/// POST /allocations/{allocation_id}/pay - Record an owner's share as paid.
async fn mark_allocation_paid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(allocation_id): Path<Uuid>,
) -> ApiResult<Json<expense_allocations::Model>> {
    let repo = BillingRepository::new(state.conn());
    let (_, bill) = repo.get_allocation(allocation_id).await?;
    user.ensure_manages_building(bill.building_id)?;
    Ok(Json(repo.mark_allocation_paid(allocation_id).await?))
}

/// GET /payments - Expense payments, newest first.
async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<PaymentView>>> {
    let scope = user.managed_scope()?;
    Ok(Json(
        BillingRepository::new(state.conn())
            .list_payments(scope)
            .await?,
    ))
}

/// GET /buildings/{building_id}/outstanding-bills - Bills with money left to pay.
async fn outstanding_bills(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<Json<Vec<OutstandingBill>>> {
    user.ensure_manages_building(building_id)?;
    Ok(Json(
        BillingRepository::new(state.conn())
            .outstanding_bills(building_id)
            .await?,
    ))
}

/// POST /buildings/{building_id}/payments - Pay out against a bill.
async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<expense_payments::Model>)> {
    user.ensure_manages_building(building_id)?;
    let payment = BillingRepository::new(state.conn())
        .create_payment(NewPayment {
            building_id,
            bill_id: payload.bill_id,
            name: payload.name.trim().to_string(),
            payment_date: payload.payment_date,
            amount: payload.amount,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
