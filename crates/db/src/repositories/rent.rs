//! Rent payments received from tenants.

use ams_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{flats, rents, tenants};

/// Error types for rent operations.
#[derive(Debug, thiserror::Error)]
pub enum RentError {
    /// Rent record not found.
    #[error("Rent record not found")]
    NotFound,

    /// Tenant not found.
    #[error("Tenant not found")]
    TenantNotFound,

    /// Amount must be positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RentError> for AppError {
    fn from(err: RentError) -> Self {
        match err {
            RentError::NotFound | RentError::TenantNotFound => Self::NotFound(err.to_string()),
            RentError::NonPositiveAmount => Self::Validation(err.to_string()),
            RentError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for recording a rent payment.
#[derive(Debug, Clone)]
pub struct NewRent {
    /// Paying tenant.
    pub tenant_id: Uuid,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// Free text.
    pub notes: Option<String>,
}

/// Rent record with the context needed to authorize access to it.
#[derive(Debug, Clone, Serialize)]
pub struct RentDetails {
    /// Rent record.
    #[serde(flatten)]
    pub rent: rents::Model,
    /// Tenant name.
    pub tenant_name: String,
    /// Flat number.
    pub flat_number: String,
    /// Owner of the flat.
    #[serde(skip)]
    pub owner_id: Option<Uuid>,
}

/// Rent repository.
#[derive(Debug, Clone)]
pub struct RentRepository {
    db: DatabaseConnection,
}

impl RentRepository {
    /// Creates a new rent repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rent payments of a tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<rents::Model>, DbErr> {
        rents::Entity::find()
            .filter(rents::Column::TenantId.eq(tenant_id))
            .order_by_desc(rents::Column::PaymentDate)
            .order_by_desc(rents::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Records a rent payment.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` or `TenantNotFound`.
    pub async fn create(&self, input: NewRent) -> Result<rents::Model, RentError> {
        if input.amount <= Decimal::ZERO {
            return Err(RentError::NonPositiveAmount);
        }
        if tenants::Entity::find_by_id(input.tenant_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(RentError::TenantNotFound);
        }

        let rent = rents::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            payment_date: Set(input.payment_date),
            amount: Set(input.amount),
            notes: Set(input.notes),
            created_at: Set(chrono::Utc::now().into()),
        };
        let rent = rent.insert(&self.db).await?;
        tracing::info!(rent_id = %rent.id, tenant_id = %rent.tenant_id, amount = %rent.amount, "Rent recorded");

        Ok(rent)
    }

    /// Loads a rent record with tenant, flat, and owner.
    ///
    /// # Errors
    ///
    /// Returns `RentError::NotFound` if the record or its tenant is gone.
    pub async fn get_details(&self, id: Uuid) -> Result<RentDetails, RentError> {
        let (rent, tenant) = rents::Entity::find_by_id(id)
            .find_also_related(tenants::Entity)
            .one(&self.db)
            .await?
            .ok_or(RentError::NotFound)?;
        let tenant = tenant.ok_or(RentError::NotFound)?;
        let flat = flats::Entity::find_by_id(tenant.flat_id)
            .one(&self.db)
            .await?
            .ok_or(RentError::NotFound)?;

        Ok(RentDetails {
            rent,
            tenant_name: tenant.full_name,
            flat_number: flat.flat_number,
            owner_id: flat.owner_id,
        })
    }
}
