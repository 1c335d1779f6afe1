//! Visitor register repository.

use ams_core::BuildingScope;
use ams_core::entry_log::{EntryLogError as EntryRule, EntryType, validate_entry};
use ams_shared::AppError;
use ams_shared::types::{PageRequest, PageResponse};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{buildings, entry_logs, flats};

/// Error types for entry log operations.
#[derive(Debug, thiserror::Error)]
pub enum EntryLogError {
    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// Flat not found.
    #[error("Flat not found")]
    FlatNotFound,

    /// Input breaks a register rule.
    #[error(transparent)]
    Rule(#[from] EntryRule),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<EntryLogError> for AppError {
    fn from(err: EntryLogError) -> Self {
        match err {
            EntryLogError::BuildingNotFound | EntryLogError::FlatNotFound => {
                Self::NotFound(err.to_string())
            }
            EntryLogError::Rule(rule) => rule.into(),
            EntryLogError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for a register entry.
#[derive(Debug, Clone)]
pub struct NewEntryLog {
    /// Building entered.
    pub building_id: Uuid,
    /// Flat visited.
    pub flat_id: Uuid,
    /// Visitor full name.
    pub visitor_name: String,
    /// Visitor phone.
    pub phone_number: Option<String>,
    /// Category.
    pub entry_type: EntryType,
    /// Head count.
    pub number_of_persons: i32,
    /// Reason for the visit.
    pub purpose: String,
    /// Entry time.
    pub entry_time: DateTime<Utc>,
    /// Exit time, if already left.
    pub exit_time: Option<DateTime<Utc>>,
    /// User who recorded the entry.
    pub recorded_by: Uuid,
}

/// Register row with building name and flat number.
#[derive(Debug, Clone, Serialize)]
pub struct EntryLogView {
    /// Entry record.
    #[serde(flatten)]
    pub entry: entry_logs::Model,
    /// Building name.
    pub building_name: String,
    /// Flat number.
    pub flat_number: String,
}

/// Entry log repository.
#[derive(Debug, Clone)]
pub struct EntryLogRepository {
    db: DatabaseConnection,
}

impl EntryLogRepository {
    /// Creates a new entry log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// A page of entries visible under `scope`, latest entry first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: BuildingScope,
        page: PageRequest,
    ) -> Result<PageResponse<EntryLogView>, DbErr> {
        let page = page.normalized();
        let mut query = entry_logs::Entity::find();
        match scope {
            BuildingScope::All => {}
            BuildingScope::Only(id) => {
                query = query.filter(entry_logs::Column::BuildingId.eq(id));
            }
            BuildingScope::Nothing => return Ok(PageResponse::empty(page)),
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(entry_logs::Column::EntryTime)
            .offset(page.offset())
            .limit(page.limit())
            .find_also_related(flats::Entity)
            .all(&self.db)
            .await?;

        let building_ids: Vec<Uuid> = rows.iter().map(|(e, _)| e.building_id).collect();
        let names: HashMap<Uuid, String> = buildings::Entity::find()
            .filter(buildings::Column::Id.is_in(building_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        let data = rows
            .into_iter()
            .map(|(entry, flat)| EntryLogView {
                building_name: names.get(&entry.building_id).cloned().unwrap_or_default(),
                flat_number: flat.map(|f| f.flat_number).unwrap_or_default(),
                entry,
            })
            .collect();

        Ok(PageResponse::new(data, page, total))
    }

    /// Records a visitor entry.
    ///
    /// The flat must be in the given building, the entry may not be in the
    /// future relative to `now`, and an exit must come after the entry.
    ///
    /// # Errors
    ///
    /// Returns `BuildingNotFound`, `FlatNotFound`, or a `Rule` error.
    pub async fn create(
        &self,
        input: NewEntryLog,
        now: DateTime<Utc>,
    ) -> Result<entry_logs::Model, EntryLogError> {
        validate_entry(
            input.entry_time,
            input.exit_time,
            input.number_of_persons,
            now,
        )?;

        if buildings::Entity::find_by_id(input.building_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(EntryLogError::BuildingNotFound);
        }
        let flat = flats::Entity::find_by_id(input.flat_id)
            .one(&self.db)
            .await?
            .ok_or(EntryLogError::FlatNotFound)?;
        if flat.building_id != input.building_id {
            return Err(EntryRule::FlatNotInBuilding.into());
        }

        let entry = entry_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            building_id: Set(input.building_id),
            flat_id: Set(input.flat_id),
            visitor_name: Set(input.visitor_name),
            phone_number: Set(input.phone_number),
            entry_type: Set(input.entry_type.into()),
            number_of_persons: Set(input.number_of_persons),
            purpose: Set(input.purpose),
            entry_time: Set(input.entry_time.into()),
            exit_time: Set(input.exit_time.map(Into::into)),
            recorded_by: Set(Some(input.recorded_by)),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(entry_id = %entry.id, building_id = %entry.building_id, "Entry logged");
        Ok(entry)
    }
}
