//! Tenant repository.

use std::collections::HashMap;

use ams_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{flats, tenants};

/// Error types for tenant operations.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    /// Tenant not found.
    #[error("Tenant not found")]
    NotFound,

    /// Flat not found.
    #[error("Flat not found")]
    FlatNotFound,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotFound | TenantError::FlatNotFound => Self::NotFound(err.to_string()),
            TenantError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for registering a tenant.
#[derive(Debug, Clone)]
pub struct NewTenant {
    /// Flat the tenant lives in.
    pub flat_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Optional email.
    pub email: Option<String>,
    /// Phone.
    pub phone_number: String,
    /// Whether the tenant currently lives there.
    pub is_active: bool,
}

/// Tenant with the number of the flat they rent.
#[derive(Debug, Clone, Serialize)]
pub struct TenantWithFlat {
    /// Tenant record.
    #[serde(flatten)]
    pub tenant: tenants::Model,
    /// Flat number.
    pub flat_number: String,
}

/// Tenant repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a tenant together with their flat.
    ///
    /// # Errors
    ///
    /// Returns `TenantError::NotFound` if there is no such tenant.
    pub async fn get_with_flat(
        &self,
        id: Uuid,
    ) -> Result<(tenants::Model, flats::Model), TenantError> {
        match tenants::Entity::find_by_id(id)
            .find_also_related(flats::Entity)
            .one(&self.db)
            .await?
        {
            Some((tenant, Some(flat))) => Ok((tenant, flat)),
            _ => Err(TenantError::NotFound),
        }
    }

    /// Tenants of a flat, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_flat(&self, flat_id: Uuid) -> Result<Vec<tenants::Model>, DbErr> {
        tenants::Entity::find()
            .filter(tenants::Column::FlatId.eq(flat_id))
            .order_by_asc(tenants::Column::FullName)
            .all(&self.db)
            .await
    }

    /// Registers a tenant.
    ///
    /// # Errors
    ///
    /// Returns `TenantError::FlatNotFound` if the flat does not exist.
    pub async fn create(&self, input: NewTenant) -> Result<tenants::Model, TenantError> {
        if flats::Entity::find_by_id(input.flat_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(TenantError::FlatNotFound);
        }

        let tenant = tenants::ActiveModel {
            id: Set(Uuid::new_v4()),
            flat_id: Set(input.flat_id),
            full_name: Set(input.full_name),
            email: Set(input.email),
            phone_number: Set(input.phone_number),
            is_active: Set(input.is_active),
            created_at: Set(chrono::Utc::now().into()),
        };
        let tenant = tenant.insert(&self.db).await?;
        tracing::info!(tenant_id = %tenant.id, flat_id = %tenant.flat_id, "Tenant registered");

        Ok(tenant)
    }

    /// Tenants across all flats of an owner, ordered by flat number then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<TenantWithFlat>, DbErr> {
        let flats: HashMap<Uuid, String> = flats::Entity::find()
            .filter(flats::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f.flat_number))
            .collect();

        let mut rows: Vec<TenantWithFlat> = tenants::Entity::find()
            .filter(tenants::Column::FlatId.is_in(flats.keys().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|tenant| TenantWithFlat {
                flat_number: flats.get(&tenant.flat_id).cloned().unwrap_or_default(),
                tenant,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.flat_number
                .cmp(&b.flat_number)
                .then_with(|| a.tenant.full_name.cmp(&b.tenant.full_name))
        });

        Ok(rows)
    }
}
