//! Building routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::not_blank;
use ams_core::Role;
use ams_db::{
    BuildingRepository,
    entities::buildings,
    repositories::{BuildingDetails, BuildingInput},
};

/// Creates the building routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/buildings", get(list_buildings).post(create_building))
        .route(
            "/buildings/{building_id}",
            get(get_building).put(update_building).delete(delete_building),
        )
}

/// Request body for creating or updating a building.
#[derive(Debug, Deserialize, Validate)]
pub struct BuildingRequest {
    /// Building name, unique.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Building name is required (max 100 characters)"))]
    pub name: String,
    /// Street address.
    #[validate(length(max = 200, message = "Address is too long"))]
    pub address: Option<String>,
}

impl From<BuildingRequest> for BuildingInput {
    fn from(req: BuildingRequest) -> Self {
        Self {
            name: req.name,
            address: req.address,
        }
    }
}

/// GET /buildings - Super admins see all, presidents their own.
async fn list_buildings(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<buildings::Model>>> {
    let scope = user.managed_scope()?;
    Ok(Json(BuildingRepository::new(state.conn()).list(scope).await?))
}

/// GET /buildings/{building_id} - A building with its flats.
async fn get_building(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<Json<BuildingDetails>> {
    user.ensure_manages_building(building_id)?;
    Ok(Json(
        BuildingRepository::new(state.conn())
            .get_with_flats(building_id)
            .await?,
    ))
}

/// POST /buildings - Create a building.
async fn create_building(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<BuildingRequest>,
) -> ApiResult<(StatusCode, Json<buildings::Model>)> {
    user.require_any(&[Role::SuperAdmin])?;
    let building = BuildingRepository::new(state.conn())
        .create(payload.into())
        .await?;
    info!(building_id = %building.id, name = %building.name, "Building created");
    Ok((StatusCode::CREATED, Json(building)))
}

/// PUT /buildings/{building_id} - Rename or re-address a building.
async fn update_building(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<BuildingRequest>,
) -> ApiResult<Json<buildings::Model>> {
    user.require_any(&[Role::SuperAdmin])?;
    Ok(Json(
        BuildingRepository::new(state.conn())
            .update(building_id, payload.into())
            .await?,
    ))
}

/// DELETE /buildings/{building_id} - Delete a building and its flats.
async fn delete_building(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require_any(&[Role::SuperAdmin])?;
    BuildingRepository::new(state.conn())
        .delete(building_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
