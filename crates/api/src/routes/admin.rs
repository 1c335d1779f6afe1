//! Account administration: user list, account creation, president
//! assignment, and owner approval.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::not_blank;
use ams_core::{BuildingScope, Role, auth::hash_password};
use ams_db::{
    BuildingRepository, UserRepository,
    entities::users,
    repositories::{NewUser, UserSummary},
};
use ams_shared::AppError;

/// Creates the admin routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/president-options", get(president_options))
        .route("/admin/users/{user_id}/president", post(assign_president))
        .route("/admin/pending-owners", get(pending_owners))
        .route("/admin/users/{user_id}/approve-owner", post(approve_owner))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,
    /// Display name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    /// Optional phone.
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
    /// Role name, e.g. "Owner" or "President".
    #[validate(custom(function = "not_blank"), length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Request body for assigning a president.
#[derive(Debug, Deserialize, Validate)]
pub struct AssignPresidentRequest {
    /// Building to preside over.
    pub building_id: Uuid,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Phone.
    pub phone_number: Option<String>,
    /// Assigned building.
    pub building_id: Option<Uuid>,
    /// Held roles.
    pub roles: Vec<Role>,
}

impl UserResponse {
    fn new(user: users::Model, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            building_id: user.building_id,
            roles,
        }
    }
}

/// Dropdown entry.
#[derive(Debug, Serialize)]
pub struct SelectOption {
    /// Value.
    pub id: Uuid,
    /// Label.
    pub label: String,
}

/// Data for the president assignment form.
#[derive(Debug, Serialize)]
pub struct PresidentOptions {
    /// Buildings by name.
    pub buildings: Vec<SelectOption>,
    /// Owners as "Full Name (email)".
    pub owners: Vec<SelectOption>,
}

/// GET /admin/users - Every account except the caller's.
async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    user.require_any(&[Role::SuperAdmin])?;
    let users = UserRepository::new(state.conn())
        .list_summaries(user.user_id)
        .await?;
    Ok(Json(users))
}

/// POST /admin/users - Create an account with a chosen role.
async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    user.require_any(&[Role::SuperAdmin])?;

    let role: Role = payload
        .role
        .parse()
        .map_err(|e: ams_core::auth::UnknownRole| AppError::Validation(e.to_string()))?;
    if !role.is_assignable() {
        return Err(AppError::Validation(format!("Role {role} cannot be assigned")).into());
    }

    let roles = role.granted_with();
    let created = UserRepository::new(state.conn())
        .create(NewUser {
            email: payload.email,
            password_hash: hash_password(&payload.password)?,
            full_name: payload.full_name.trim().to_string(),
            phone_number: payload.phone_number,
            roles: roles.clone(),
        })
        .await?;

    info!(user_id = %created.id, role = %role, created_by = %user.user_id, "Account created");
    Ok((StatusCode::CREATED, Json(UserResponse::new(created, roles))))
}

/// GET /admin/president-options - Buildings and owners for the assignment form.
async fn president_options(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PresidentOptions>> {
    user.require_any(&[Role::SuperAdmin])?;

    let buildings = BuildingRepository::new(state.conn())
        .list(BuildingScope::All)
        .await?
        .into_iter()
        .map(|b| SelectOption {
            id: b.id,
            label: b.name,
        })
        .collect();
    let owners = UserRepository::new(state.conn())
        .with_role(Role::Owner)
        .await?
        .into_iter()
        .map(|u| SelectOption {
            id: u.id,
            label: format!("{} ({})", u.full_name, u.email),
        })
        .collect();

    Ok(Json(PresidentOptions { buildings, owners }))
}

/// POST /admin/users/{user_id}/president - Make an owner a building's president.
async fn assign_president(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AssignPresidentRequest>,
) -> ApiResult<Json<UserResponse>> {
    user.require_any(&[Role::SuperAdmin])?;

    let repo = UserRepository::new(state.conn());
    let updated = repo.assign_president(user_id, payload.building_id).await?;
    let roles = repo.roles_of(user_id).await?;
    Ok(Json(UserResponse::new(updated, roles)))
}

/// GET /admin/pending-owners - Registered users not yet approved as owners.
async fn pending_owners(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    user.require_any(&[Role::SuperAdmin, Role::President])?;

    let pending = UserRepository::new(state.conn())
        .pending_owners()
        .await?
        .into_iter()
        .map(|u| UserResponse::new(u, vec![Role::User]))
        .collect();
    Ok(Json(pending))
}

/// POST /admin/users/{user_id}/approve-owner - Grant the Owner role.
async fn approve_owner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    user.require_any(&[Role::SuperAdmin, Role::President])?;

    let repo = UserRepository::new(state.conn());
    repo.add_role(user_id, Role::Owner).await?;
    let approved = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let roles = repo.roles_of(user_id).await?;

    info!(user_id = %user_id, approved_by = %user.user_id, "Owner approved");
    Ok(Json(UserResponse::new(approved, roles)))
}
