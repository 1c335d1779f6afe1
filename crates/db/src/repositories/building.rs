//! Building repository.

use ams_core::BuildingScope;
use ams_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{is_unique_violation, vanished_as};
use crate::entities::{buildings, flats};

/// Error types for building operations.
#[derive(Debug, thiserror::Error)]
pub enum BuildingError {
    /// Building not found.
    #[error("Building not found")]
    NotFound,

    /// Another building already uses the name.
    #[error("A building named '{0}' already exists")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BuildingError> for AppError {
    fn from(err: BuildingError) -> Self {
        match err {
            BuildingError::NotFound => Self::NotFound(err.to_string()),
            BuildingError::DuplicateName(_) => Self::Conflict(err.to_string()),
            BuildingError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or updating a building.
#[derive(Debug, Clone)]
pub struct BuildingInput {
    /// Unique name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
}

/// Building with its flats.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildingDetails {
    /// Building record.
    #[serde(flatten)]
    pub building: buildings::Model,
    /// Flats ordered by number.
    pub flats: Vec<flats::Model>,
}

/// Building repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BuildingRepository {
    db: DatabaseConnection,
}

impl BuildingRepository {
    /// Creates a new building repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists buildings visible under `scope`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, scope: BuildingScope) -> Result<Vec<buildings::Model>, DbErr> {
        let query = buildings::Entity::find().order_by_asc(buildings::Column::Name);
        match scope {
            BuildingScope::All => query.all(&self.db).await,
            BuildingScope::Only(id) => {
                query
                    .filter(buildings::Column::Id.eq(id))
                    .all(&self.db)
                    .await
            }
            BuildingScope::Nothing => Ok(Vec::new()),
        }
    }

    /// Finds a building by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<buildings::Model>, DbErr> {
        buildings::Entity::find_by_id(id).one(&self.db).await
    }

    /// Loads a building or fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `BuildingError::NotFound` if there is no such building.
    pub async fn get(&self, id: Uuid) -> Result<buildings::Model, BuildingError> {
        self.find_by_id(id).await?.ok_or(BuildingError::NotFound)
    }

    /// Loads a building with its flats.
    ///
    /// # Errors
    ///
    /// Returns `BuildingError::NotFound` if there is no such building.
    pub async fn get_with_flats(&self, id: Uuid) -> Result<BuildingDetails, BuildingError> {
        let building = self.get(id).await?;
        let flats = building
            .find_related(flats::Entity)
            .order_by_asc(flats::Column::FlatNumber)
            .all(&self.db)
            .await?;

        Ok(BuildingDetails { building, flats })
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> Result<bool, DbErr> {
        let mut query = buildings::Entity::find().filter(buildings::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(buildings::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// Creates a building.
    ///
    /// # Errors
    ///
    /// Returns `BuildingError::DuplicateName` if the name is taken.
    pub async fn create(&self, input: BuildingInput) -> Result<buildings::Model, BuildingError> {
        let name = input.name.trim().to_string();
        if self.name_taken(&name, None).await? {
            return Err(BuildingError::DuplicateName(name));
        }

        let now = chrono::Utc::now().into();
        let building = buildings::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            address: Set(input.address),
            created_at: Set(now),
            updated_at: Set(now),
        };

        building.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                BuildingError::DuplicateName(name)
            } else {
                e.into()
            }
        })
    }

    /// Renames or re-addresses a building.
    ///
    /// # Errors
    ///
    /// Returns `BuildingError::NotFound` if the building is gone, including
    /// when it is deleted between the read and the write.
    pub async fn update(
        &self,
        id: Uuid,
        input: BuildingInput,
    ) -> Result<buildings::Model, BuildingError> {
        let building = self.get(id).await?;
        let name = input.name.trim().to_string();
        if self.name_taken(&name, Some(id)).await? {
            return Err(BuildingError::DuplicateName(name));
        }

        let mut active: buildings::ActiveModel = building.into();
        active.name = Set(name);
        active.address = Set(input.address);
        active.updated_at = Set(chrono::Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| vanished_as(e, BuildingError::NotFound))
    }

    /// Deletes a building and, through the foreign key, its flats.
    ///
    /// # Errors
    ///
    /// Returns `BuildingError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), BuildingError> {
        let result = buildings::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(BuildingError::NotFound);
        }
        tracing::info!(building_id = %id, "Building deleted");
        Ok(())
    }
}
