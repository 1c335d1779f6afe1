//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod admin;
pub mod auth;
pub mod billing;
pub mod buildings;
pub mod entry_logs;
pub mod expenses;
pub mod flats;
pub mod health;
pub mod reports;
pub mod tenants;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(admin::routes())
        .merge(buildings::routes())
        .merge(flats::routes())
        .merge(tenants::routes())
        .merge(billing::routes())
        .merge(expenses::routes())
        .merge(entry_logs::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
