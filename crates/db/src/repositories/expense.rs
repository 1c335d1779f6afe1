//! Common expense repository.
//!
//! Expenses are recorded per building and, unlike bills, are not split
//! across owners.

use ams_core::BuildingScope;
use ams_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::vanished_as;
use crate::entities::{buildings, common_expenses};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found")]
    NotFound,

    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// Amount must be positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::NotFound | ExpenseError::BuildingNotFound => {
                Self::NotFound(err.to_string())
            }
            ExpenseError::NonPositiveAmount => Self::Validation(err.to_string()),
            ExpenseError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or editing an expense.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    /// Expense name.
    pub name: String,
    /// Expense date.
    pub expense_date: NaiveDate,
    /// Amount.
    pub amount: Decimal,
    /// Free text.
    pub notes: Option<String>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Expenses visible under `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, scope: BuildingScope) -> Result<Vec<common_expenses::Model>, DbErr> {
        let query = common_expenses::Entity::find()
            .order_by_desc(common_expenses::Column::ExpenseDate)
            .order_by_desc(common_expenses::Column::CreatedAt);
        match scope {
            BuildingScope::All => query.all(&self.db).await,
            BuildingScope::Only(id) => {
                query
                    .filter(common_expenses::Column::BuildingId.eq(id))
                    .all(&self.db)
                    .await
            }
            BuildingScope::Nothing => Ok(Vec::new()),
        }
    }

    /// Loads an expense.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` if there is no such expense.
    pub async fn get(&self, id: Uuid) -> Result<common_expenses::Model, ExpenseError> {
        common_expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound)
    }

    /// Records an expense for a building.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` or `BuildingNotFound`.
    pub async fn create(
        &self,
        building_id: Uuid,
        input: ExpenseInput,
    ) -> Result<common_expenses::Model, ExpenseError> {
        if input.amount <= Decimal::ZERO {
            return Err(ExpenseError::NonPositiveAmount);
        }
        if buildings::Entity::find_by_id(building_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ExpenseError::BuildingNotFound);
        }

        let now = chrono::Utc::now().into();
        let expense = common_expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            building_id: Set(building_id),
            name: Set(input.name),
            expense_date: Set(input.expense_date),
            amount: Set(input.amount),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(expense.insert(&self.db).await?)
    }

    /// Edits an expense. The building never changes.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` if the expense is gone, including
    /// when it is deleted between the read and the write.
    pub async fn update(
        &self,
        id: Uuid,
        input: ExpenseInput,
    ) -> Result<common_expenses::Model, ExpenseError> {
        if input.amount <= Decimal::ZERO {
            return Err(ExpenseError::NonPositiveAmount);
        }
        let expense = self.get(id).await?;

        let mut active: common_expenses::ActiveModel = expense.into();
        active.name = Set(input.name);
        active.expense_date = Set(input.expense_date);
        active.amount = Set(input.amount);
        active.notes = Set(input.notes);
        active.updated_at = Set(chrono::Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| vanished_as(e, ExpenseError::NotFound))
    }

    /// Deletes an expense.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), ExpenseError> {
        let result = common_expenses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound);
        }
        Ok(())
    }
}
