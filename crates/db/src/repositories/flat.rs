//! Flat repository: flats, ownership, and occupancy.

use std::collections::HashMap;

use ams_core::Role;
use ams_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use super::{is_unique_violation, vanished_as};
use crate::entities::{
    buildings, flats, sea_orm_active_enums::RoleName, tenants, user_roles, users,
};

/// Error types for flat operations.
#[derive(Debug, thiserror::Error)]
pub enum FlatError {
    /// Flat not found.
    #[error("Flat not found")]
    NotFound,

    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// Flat number already used in the building.
    #[error("Flat {0} already exists in this building")]
    DuplicateNumber(String),

    /// User does not exist.
    #[error("User not found")]
    OwnerNotFound,

    /// Only owners can be assigned to flats.
    #[error("Selected user does not have the Owner role")]
    OwnerLacksRole,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FlatError> for AppError {
    fn from(err: FlatError) -> Self {
        match err {
            FlatError::NotFound | FlatError::BuildingNotFound | FlatError::OwnerNotFound => {
                Self::NotFound(err.to_string())
            }
            FlatError::DuplicateNumber(_) => Self::Conflict(err.to_string()),
            FlatError::OwnerLacksRole => Self::BusinessRule(err.to_string()),
            FlatError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Flat row for a building's flat list.
#[derive(Debug, Clone, Serialize)]
pub struct FlatListItem {
    /// Flat ID.
    pub id: Uuid,
    /// Flat number.
    pub flat_number: String,
    /// Whether someone lives there.
    pub is_occupied: bool,
    /// Owner ID.
    pub owner_id: Option<Uuid>,
    /// Owner display name.
    pub owner_name: Option<String>,
}

/// Minimal flat reference for dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct FlatOption {
    /// Flat ID.
    pub id: Uuid,
    /// Flat number.
    pub flat_number: String,
}

/// An owner's flat with its building and tenants.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedFlat {
    /// Flat record.
    #[serde(flatten)]
    pub flat: flats::Model,
    /// Building name.
    pub building_name: String,
    /// Tenants of the flat.
    pub tenants: Vec<tenants::Model>,
}

/// Flat repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct FlatRepository {
    db: DatabaseConnection,
}

impl FlatRepository {
    /// Creates a new flat repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a flat by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<flats::Model>, DbErr> {
        flats::Entity::find_by_id(id).one(&self.db).await
    }

    /// Loads a flat or fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `FlatError::NotFound` if there is no such flat.
    pub async fn get(&self, id: Uuid) -> Result<flats::Model, FlatError> {
        self.find_by_id(id).await?.ok_or(FlatError::NotFound)
    }

    /// Flats of a building with owner names, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_building(&self, building_id: Uuid) -> Result<Vec<FlatListItem>, DbErr> {
        let rows = flats::Entity::find()
            .filter(flats::Column::BuildingId.eq(building_id))
            .order_by_asc(flats::Column::FlatNumber)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(flat, owner)| FlatListItem {
                id: flat.id,
                flat_number: flat.flat_number,
                is_occupied: flat.is_occupied,
                owner_id: flat.owner_id,
                owner_name: owner.map(|o| o.full_name),
            })
            .collect())
    }

    /// Flat numbers of a building, for dropdowns.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn options_by_building(&self, building_id: Uuid) -> Result<Vec<FlatOption>, DbErr> {
        Ok(flats::Entity::find()
            .filter(flats::Column::BuildingId.eq(building_id))
            .order_by_asc(flats::Column::FlatNumber)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| FlatOption {
                id: f.id,
                flat_number: f.flat_number,
            })
            .collect())
    }

    /// Adds a flat to a building.
    ///
    /// # Errors
    ///
    /// Returns `BuildingNotFound` or `DuplicateNumber`.
    pub async fn create(
        &self,
        building_id: Uuid,
        flat_number: &str,
        is_occupied: bool,
    ) -> Result<flats::Model, FlatError> {
        if buildings::Entity::find_by_id(building_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(FlatError::BuildingNotFound);
        }

        let flat_number = flat_number.trim().to_string();
        let taken = flats::Entity::find()
            .filter(flats::Column::BuildingId.eq(building_id))
            .filter(flats::Column::FlatNumber.eq(flat_number.as_str()))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(FlatError::DuplicateNumber(flat_number));
        }

        let flat = flats::ActiveModel {
            id: Set(Uuid::new_v4()),
            building_id: Set(building_id),
            flat_number: Set(flat_number.clone()),
            owner_id: Set(None),
            is_occupied: Set(is_occupied),
            created_at: Set(chrono::Utc::now().into()),
        };

        flat.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                FlatError::DuplicateNumber(flat_number)
            } else {
                e.into()
            }
        })
    }

    /// Sets the owner of a flat. The new owner must hold the Owner role.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `OwnerNotFound`, or `OwnerLacksRole`.
    pub async fn assign_owner(
        &self,
        flat_id: Uuid,
        owner_id: Uuid,
    ) -> Result<flats::Model, FlatError> {
        let flat = self.get(flat_id).await?;
        if users::Entity::find_by_id(owner_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(FlatError::OwnerNotFound);
        }
        let is_owner = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(owner_id))
            .filter(user_roles::Column::Role.eq(RoleName::from(Role::Owner)))
            .count(&self.db)
            .await?
            > 0;
        if !is_owner {
            return Err(FlatError::OwnerLacksRole);
        }

        let mut active: flats::ActiveModel = flat.into();
        active.owner_id = Set(Some(owner_id));
        let flat = active
            .update(&self.db)
            .await
            .map_err(|e| vanished_as(e, FlatError::NotFound))?;

        tracing::info!(flat_id = %flat_id, owner_id = %owner_id, "Flat owner assigned");
        Ok(flat)
    }

    /// Flips the occupancy flag.
    ///
    /// # Errors
    ///
    /// Returns `FlatError::NotFound` if the flat is gone.
    pub async fn toggle_occupancy(&self, flat_id: Uuid) -> Result<flats::Model, FlatError> {
        let flat = self.get(flat_id).await?;
        let occupied = flat.is_occupied;
        let mut active: flats::ActiveModel = flat.into();
        active.is_occupied = Set(!occupied);
        active
            .update(&self.db)
            .await
            .map_err(|e| vanished_as(e, FlatError::NotFound))
    }

    /// Flats owned by a user with building names and tenants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn owned_by(&self, owner_id: Uuid) -> Result<Vec<OwnedFlat>, DbErr> {
        let rows = flats::Entity::find()
            .filter(flats::Column::OwnerId.eq(owner_id))
            .order_by_asc(flats::Column::FlatNumber)
            .find_also_related(buildings::Entity)
            .all(&self.db)
            .await?;

        let flat_ids: Vec<Uuid> = rows.iter().map(|(f, _)| f.id).collect();
        let mut by_flat: HashMap<Uuid, Vec<tenants::Model>> = HashMap::new();
        for tenant in tenants::Entity::find()
            .filter(tenants::Column::FlatId.is_in(flat_ids))
            .order_by_asc(tenants::Column::FullName)
            .all(&self.db)
            .await?
        {
            by_flat.entry(tenant.flat_id).or_default().push(tenant);
        }

        Ok(rows
            .into_iter()
            .map(|(flat, building)| OwnedFlat {
                tenants: by_flat.remove(&flat.id).unwrap_or_default(),
                building_name: building.map(|b| b.name).unwrap_or_default(),
                flat,
            })
            .collect())
    }
}
