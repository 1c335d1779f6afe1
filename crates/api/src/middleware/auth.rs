//! Authentication middleware for protected routes.

use std::ops::Deref;

use ams_core::Principal;
use ams_db::UserRepository;
use ams_shared::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates access tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it as an access token
/// 3. Reloads the user, so role changes and deactivation apply immediately
/// 4. Stores the [`Principal`] in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(ToOwned::to_owned);

    match authenticate(&state, token).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authenticate(state: &AppState, token: Option<String>) -> Result<Principal, ApiError> {
    let token = token.ok_or_else(|| {
        AppError::Unauthorized("Authorization header with Bearer token is required".to_string())
    })?;

    let claims = state.jwt_service.validate_access_token(&token)?;

    UserRepository::new((*state.db).clone())
        .load_principal(claims.user_id())
        .await?
        .ok_or_else(|| {
            tracing::info!(user_id = %claims.user_id(), "Token for unknown or disabled account");
            AppError::Unauthorized("Account is not active".to_string()).into()
        })
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> ApiResult<Json<Principal>> {
///     user.require_any(&[Role::SuperAdmin])?;
///     Ok(Json(user.0))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl Deref for AuthUser {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
