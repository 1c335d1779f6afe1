//! Authentication routes for register, login, token refresh, and the
//! current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::not_blank;
use ams_core::{
    Principal, Role,
    auth::{hash_password, verify_password},
};
use ams_db::{UserRepository, entities::users, repositories::NewUser};
use ams_shared::{
    AppError,
    auth::{LoginResponse, TokenPair, UserInfo},
};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that need a logged-in caller.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Request body for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6 and 100 characters"
    ))]
    pub password: String,
    /// Must repeat `password`.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    /// Display name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    /// Optional phone.
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    /// A refresh token from login.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

async fn login_response(
    state: &AppState,
    repo: &UserRepository,
    user: users::Model,
) -> ApiResult<LoginResponse> {
    let roles = repo.roles_of(user.id).await?;
    let tokens = state.jwt_service.issue_pair(user.id, &user.email)?;

    Ok(LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            building_id: user.building_id,
        },
        tokens,
    })
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.conn());

    let Some(user) = repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials().into());
    };

    if !user.is_active {
        return Err(AppError::Unauthorized("This account has been disabled".to_string()).into());
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials().into());
    }

    info!(user_id = %user.id, "User logged in successfully");
    Ok(Json(login_response(&state, &repo, user).await?))
}

/// POST /auth/register - Self-register with the `User` role.
///
/// The account waits for a president or super admin to approve it as an owner.
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let repo = UserRepository::new(state.conn());

    let user = repo
        .create(NewUser {
            email: payload.email,
            password_hash: hash_password(&payload.password)?,
            full_name: payload.full_name.trim().to_string(),
            phone_number: payload.phone_number,
            roles: vec![Role::User],
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "New user registered");
    Ok((
        StatusCode::CREATED,
        Json(login_response(&state, &repo, user).await?),
    ))
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)?;

    // The account may have been disabled since the token was issued.
    let principal = UserRepository::new(state.conn())
        .load_principal(claims.user_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account is not active".to_string()))?;

    Ok(Json(
        state
            .jwt_service
            .issue_pair(principal.user_id, &principal.email)?,
    ))
}

/// GET /auth/me - The authenticated caller.
async fn me(user: AuthUser) -> Json<Principal> {
    Json(user.0)
}
