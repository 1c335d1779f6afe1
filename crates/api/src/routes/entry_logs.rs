//! Visitor register routes, open to every authenticated user within their
//! building.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use crate::validation::not_blank;
use ams_core::entry_log::EntryType;
use ams_db::{
    BuildingRepository, EntryLogRepository,
    entities::entry_logs,
    repositories::{EntryLogView, NewEntryLog},
};
use ams_shared::types::{PageRequest, PageResponse};

use super::admin::SelectOption;

/// Creates the entry log routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entry-logs", get(list_entry_logs).post(create_entry_log))
        .route("/entry-logs/options", get(entry_log_options))
}

/// Request body for a register entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryLogRequest {
    /// Building entered.
    pub building_id: Uuid,
    /// Flat visited; must be in the building.
    pub flat_id: Uuid,
    /// Visitor name.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 100, message = "Visitor name is required (max 100 characters)"))]
    pub visitor_name: String,
    /// Visitor phone.
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
    /// Category.
    pub entry_type: EntryType,
    /// Head count.
    #[validate(range(min = 1, message = "Number of persons must be at least 1"))]
    pub number_of_persons: i32,
    /// Reason for the visit.
    #[validate(custom(function = "not_blank"), length(min = 1, max = 200, message = "Purpose is required (max 200 characters)"))]
    pub purpose: String,
    /// Entry time; not in the future.
    pub entry_time: DateTime<Utc>,
    /// Exit time; after the entry time.
    pub exit_time: Option<DateTime<Utc>>,
}

/// Data for the register form.
#[derive(Debug, Serialize)]
pub struct EntryLogOptions {
    /// Buildings the caller may log for.
    pub buildings: Vec<SelectOption>,
    /// Entry categories.
    pub entry_types: Vec<EntryType>,
}

/// GET /entry-logs?page=&per_page= - Register entries, latest first.
async fn list_entry_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<EntryLogView>>> {
    Ok(Json(
        EntryLogRepository::new(state.conn())
            .list(user.building_scope(), page)
            .await?,
    ))
}

/// GET /entry-logs/options - Buildings and entry types for the form.
async fn entry_log_options(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<EntryLogOptions>> {
    let buildings = BuildingRepository::new(state.conn())
        .list(user.building_scope())
        .await?
        .into_iter()
        .map(|b| SelectOption {
            id: b.id,
            label: b.name,
        })
        .collect();

    Ok(Json(EntryLogOptions {
        buildings,
        entry_types: EntryType::ALL.to_vec(),
    }))
}

/// POST /entry-logs - Record a visitor.
async fn create_entry_log(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateEntryLogRequest>,
) -> ApiResult<(StatusCode, Json<entry_logs::Model>)> {
    user.ensure_in_building(payload.building_id)?;

    let entry = EntryLogRepository::new(state.conn())
        .create(
            NewEntryLog {
                building_id: payload.building_id,
                flat_id: payload.flat_id,
                visitor_name: payload.visitor_name.trim().to_string(),
                phone_number: payload.phone_number,
                entry_type: payload.entry_type,
                number_of_persons: payload.number_of_persons,
                purpose: payload.purpose.trim().to_string(),
                entry_time: payload.entry_time,
                exit_time: payload.exit_time,
                recorded_by: user.user_id,
            },
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
