//! Common expense routes.

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
    ExpenseRepository,
    entities::common_expenses,
    repositories::ExpenseInput,
};

/// Creates the expense routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/buildings/{building_id}/expenses", post(create_expense))
        .route(
            "/expenses/{expense_id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

/// Request body for creating or editing an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct ExpenseRequest {
    /// Expense name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Expense name is required (max 100 characters)"))]
    pub name: String,
    /// Expense date.
    pub expense_date: NaiveDate,
    /// Amount; must be positive.
    #[validate(custom(function = "cents"))]
    pub amount: Decimal,
    /// Free text.
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl From<ExpenseRequest> for ExpenseInput {
    fn from(req: ExpenseRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            expense_date: req.expense_date,
            amount: req.amount,
            notes: req.notes,
        }
    }
}

/// GET /expenses - Expenses of the caller's buildings, newest first.
async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<common_expenses::Model>>> {
    let scope = user.managed_scope()?;
    Ok(Json(ExpenseRepository::new(state.conn()).list(scope).await?))
}

/// POST /buildings/{building_id}/expenses - Record an expense.
async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<common_expenses::Model>)> {
    user.ensure_manages_building(building_id)?;
    let expense = ExpenseRepository::new(state.conn())
        .create(building_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /expenses/{expense_id} - One expense.
async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> ApiResult<Json<common_expenses::Model>> {
    let expense = ExpenseRepository::new(state.conn()).get(expense_id).await?;
    user.ensure_manages_building(expense.building_id)?;
    Ok(Json(expense))
}

/// PUT /expenses/{expense_id} - Edit an expense; it stays in its building.
async fn update_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ExpenseRequest>,
) -> ApiResult<Json<common_expenses::Model>> {
    let repo = ExpenseRepository::new(state.conn());
    let expense = repo.get(expense_id).await?;
    user.ensure_manages_building(expense.building_id)?;
    Ok(Json(repo.update(expense_id, payload.into()).await?))
}

/// DELETE /expenses/{expense_id} - Delete an expense.
async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = ExpenseRepository::new(state.conn());
    let expense = repo.get(expense_id).await?;
    user.ensure_manages_building(expense.building_id)?;
    repo.delete(expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
