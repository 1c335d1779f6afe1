//! Flat routes: per-building flat management and the owner's own flats.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::not_blank;
use ams_core::Role;
use ams_db::{
    FlatRepository, UserRepository,
    entities::flats,
    repositories::{FlatListItem, FlatOption, OwnedFlat},
};

use super::admin::SelectOption;

/// Creates the flat routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/buildings/{building_id}/flats",
            get(list_flats).post(create_flat),
        )
        .route("/buildings/{building_id}/flat-options", get(flat_options))
        .route("/buildings/{building_id}/owner-options", get(owner_options))
        .route("/flats/{flat_id}/owner", put(assign_owner))
        .route("/flats/{flat_id}/toggle-occupancy", post(toggle_occupancy))
        .route("/owner/flats", get(my_flats))
}

/// Request body for adding a flat.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlatRequest {
    /// Flat number, unique within the building.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 50, message = "Flat number is required (max 50 characters)"))]
    pub flat_number: String,
    /// Whether someone lives there.
    #[serde(default)]
    pub is_occupied: bool,
}

/// Request body for assigning an owner.
#[derive(Debug, Deserialize, Validate)]
pub struct AssignOwnerRequest {
    /// New owner; must hold the Owner role.
    pub owner_id: Uuid,
}

/// GET /buildings/{building_id}/flats - Flats with owner names.
async fn list_flats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<Json<Vec<FlatListItem>>> {
    user.ensure_manages_building(building_id)?;
    Ok(Json(
        FlatRepository::new(state.conn())
            .list_by_building(building_id)
            .await?,
    ))
}

/// POST /buildings/{building_id}/flats - Add a flat.
async fn create_flat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateFlatRequest>,
) -> ApiResult<(StatusCode, Json<flats::Model>)> {
    user.ensure_manages_building(building_id)?;
    let flat = FlatRepository::new(state.conn())
        .create(building_id, &payload.flat_number, payload.is_occupied)
        .await?;
    tracing::info!(flat_id = %flat.id, building_id = %building_id, "Flat created");
    Ok((StatusCode::CREATED, Json(flat)))
}

/// GET /buildings/{building_id}/flat-options - `[{id, flat_number}]` for forms.
async fn flat_options(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<Json<Vec<FlatOption>>> {
    user.ensure_in_building(building_id)?;
    Ok(Json(
        FlatRepository::new(state.conn())
            .options_by_building(building_id)
            .await?,
    ))
}

/// GET /buildings/{building_id}/owner-options - Owners for the assign form.
async fn owner_options(
    State(state): State<AppState>,
    user: AuthUser,
    Path(building_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SelectOption>>> {
    user.ensure_manages_building(building_id)?;
    let owners = UserRepository::new(state.conn())
        .with_role(Role::Owner)
        .await?
        .into_iter()
        .map(|u| SelectOption {
            id: u.id,
            label: format!("{} ({})", u.full_name, u.email),
        })
        .collect();
    Ok(Json(owners))
}

/// PUT /flats/{flat_id}/owner - Assign the flat's owner.
async fn assign_owner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(flat_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AssignOwnerRequest>,
) -> ApiResult<Json<flats::Model>> {
    let repo = FlatRepository::new(state.conn());
    let flat = repo.get(flat_id).await?;
    user.ensure_manages_building(flat.building_id)?;
    Ok(Json(repo.assign_owner(flat_id, payload.owner_id).await?))
}

/// POST /flats/{flat_id}/toggle-occupancy - Flip the occupancy flag.
async fn toggle_occupancy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(flat_id): Path<Uuid>,
) -> ApiResult<Json<flats::Model>> {
    let repo = FlatRepository::new(state.conn());
    let flat = repo.get(flat_id).await?;
    user.ensure_owns_flat(flat.owner_id)?;
    Ok(Json(repo.toggle_occupancy(flat_id).await?))
}

/// GET /owner/flats - The caller's flats with building names and tenants.
async fn my_flats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<OwnedFlat>>> {
    user.require_any(&[Role::Owner])?;
    Ok(Json(
        FlatRepository::new(state.conn())
            .owned_by(user.user_id)
            .await?,
    ))
}
