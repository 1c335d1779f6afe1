//! Tenant and rent routes. Only the flat's owner (or a super admin) may
//! see or record anything here.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::{cents, not_blank};
use ams_core::Role;
use ams_db::{
    FlatRepository, RentRepository, TenantRepository,
    entities::{rents, tenants},
    repositories::{NewRent, NewTenant, RentDetails, TenantWithFlat},
};

/// Creates the tenant and rent routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/flats/{flat_id}/tenants",
            get(list_tenants).post(create_tenant),
        )
        .route("/owner/tenants", get(my_tenants))
        .route(
            "/tenants/{tenant_id}/rents",
            get(list_rents).post(create_rent),
        )
        .route("/rents/{rent_id}", get(get_rent))
}

/// Request body for registering a tenant.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    /// Full name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Full name is required (max 100 characters)"))]
    pub full_name: String,
    /// Optional email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Phone.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 20, message = "Phone number is required (max 20 characters)"))]
    pub phone_number: String,
    /// Whether the tenant lives there now.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request body for recording rent.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRentRequest {
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Amount received; must be positive.
    #[validate(custom(function = "cents"))]
    pub amount: Decimal,
    /// Free text.
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// GET /flats/{flat_id}/tenants - Tenants of a flat.
async fn list_tenants(
    State(state): State<AppState>,
    user: AuthUser,
    Path(flat_id): Path<Uuid>,
) -> ApiResult<Json<Vec<tenants::Model>>> {
    let flat = FlatRepository::new(state.conn()).get(flat_id).await?;
    user.ensure_owns_flat(flat.owner_id)?;
    Ok(Json(
        TenantRepository::new(state.conn())
            .list_by_flat(flat_id)
            .await?,
    ))
}

/// POST /flats/{flat_id}/tenants - Register a tenant.
async fn create_tenant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(flat_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateTenantRequest>,
) -> ApiResult<(StatusCode, Json<tenants::Model>)> {
    let flat = FlatRepository::new(state.conn()).get(flat_id).await?;
    user.ensure_owns_flat(flat.owner_id)?;

    let tenant = TenantRepository::new(state.conn())
        .create(NewTenant {
            flat_id,
            full_name: payload.full_name.trim().to_string(),
            email: payload.email,
            phone_number: payload.phone_number.trim().to_string(),
            is_active: payload.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// GET /owner/tenants - Tenants across the caller's flats.
async fn my_tenants(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<TenantWithFlat>>> {
    user.require_any(&[Role::Owner])?;
    Ok(Json(
        TenantRepository::new(state.conn())
            .list_for_owner(user.user_id)
            .await?,
    ))
}

/// GET /tenants/{tenant_id}/rents - Rent history, newest first.
async fn list_rents(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<Vec<rents::Model>>> {
    let (_, flat) = TenantRepository::new(state.conn())
        .get_with_flat(tenant_id)
        .await?;
    user.ensure_owns_flat(flat.owner_id)?;
    Ok(Json(
        RentRepository::new(state.conn())
            .list_by_tenant(tenant_id)
            .await?,
    ))
}

/// POST /tenants/{tenant_id}/rents - Record a rent payment.
async fn create_rent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tenant_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateRentRequest>,
) -> ApiResult<(StatusCode, Json<rents::Model>)> {
    let (_, flat) = TenantRepository::new(state.conn())
        .get_with_flat(tenant_id)
        .await?;
    user.ensure_owns_flat(flat.owner_id)?;

    let rent = RentRepository::new(state.conn())
        .create(NewRent {
            tenant_id,
            payment_date: payload.payment_date,
            amount: payload.amount,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(rent)))
}

/// GET /rents/{rent_id} - One rent record with tenant and flat.
async fn get_rent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(rent_id): Path<Uuid>,
) -> ApiResult<Json<RentDetails>> {
    let details = RentRepository::new(state.conn())
        .get_details(rent_id)
        .await?;
    user.ensure_owns_flat(details.owner_id)?;
    Ok(Json(details))
}
