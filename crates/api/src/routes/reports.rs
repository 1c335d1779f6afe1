//! Building report and dashboards.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use ams_core::Role;
use ams_db::{
    ReportRepository,
    repositories::{BuildingReport, OwnerDashboard, SuperAdminDashboard},
};
use ams_shared::AppError;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/building", get(building_report))
        .route("/dashboard/super-admin", get(super_admin_dashboard))
        .route("/dashboard/owner", get(owner_dashboard))
}

/// Query parameters for the building report.
#[derive(Debug, Deserialize)]
pub struct BuildingReportQuery {
    /// Building to report on. Presidents may omit it.
    pub building_id: Option<Uuid>,
}

/// GET /reports/building - Collected versus paid out for one building.
///
/// Presidents get their own building; super admins pass `building_id`.
async fn building_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BuildingReportQuery>,
) -> ApiResult<Json<BuildingReport>> {
    let building_id = query
        .building_id
        .or(user.building_id)
        .ok_or_else(|| AppError::Validation("building_id is required".to_string()))?;
    user.ensure_manages_building(building_id)?;

    Ok(Json(
        ReportRepository::new(state.conn())
            .building_report(building_id)
            .await?,
    ))
}

/// GET /dashboard/super-admin - System-wide figures.
async fn super_admin_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SuperAdminDashboard>> {
    user.require_any(&[Role::SuperAdmin])?;
    Ok(Json(
        ReportRepository::new(state.conn())
            .super_admin_dashboard()
            .await?,
    ))
}

/// GET /dashboard/owner - The caller's flats, bills, and rent income.
async fn owner_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<OwnerDashboard>> {
    user.require_any(&[Role::Owner])?;
    Ok(Json(
        ReportRepository::new(state.conn())
            .owner_dashboard(user.user_id)
            .await?,
    ))
}
