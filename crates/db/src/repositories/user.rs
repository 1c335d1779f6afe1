//! User repository: accounts, roles, and president assignment.

use std::collections::HashMap;

use ams_core::{Principal, Role};
use ams_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{
    buildings, expense_allocations, flats, sea_orm_active_enums::RoleName, tenants, user_roles,
    users,
};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found")]
    NotFound,

    /// Email already registered.
    #[error("Email is already registered")]
    EmailTaken,

    /// The user is a president already.
    #[error("User is already a President")]
    AlreadyPresident,

    /// Only owners can become presidents.
    #[error("User must hold the Owner role")]
    NotAnOwner,

    /// Building not found.
    #[error("Building not found")]
    BuildingNotFound,

    /// The building has a president.
    #[error("Building already has a President")]
    BuildingHasPresident,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound | UserError::BuildingNotFound => Self::NotFound(err.to_string()),
            UserError::EmailTaken | UserError::BuildingHasPresident | UserError::AlreadyPresident => {
                Self::Conflict(err.to_string())
            }
            UserError::NotAnOwner => Self::BusinessRule(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email; stored lowercased.
    pub email: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Optional phone.
    pub phone_number: Option<String>,
    /// Roles granted on creation.
    pub roles: Vec<Role>,
}

/// A row of the super admin's user list.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Phone.
    pub phone_number: Option<String>,
    /// Held roles.
    pub roles: Vec<Role>,
    /// Assigned building name.
    pub building_name: Option<String>,
    /// Assigned building address.
    pub building_address: Option<String>,
    /// Flats owned, across all buildings.
    pub flat_count: u64,
    /// Active tenants living in owned flats.
    pub active_tenant_count: u64,
    /// Number of unpaid allocations.
    pub outstanding_bills: u64,
    /// Sum of unpaid allocations.
    pub outstanding_amount: Decimal,
    /// Whether the account may log in.
    pub is_active: bool,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a user together with their roles.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` for a duplicate email.
    pub async fn create(&self, input: NewUser) -> Result<users::Model, UserError> {
        let email = input.email.trim().to_lowercase();
        if self.email_exists(&email).await? {
            return Err(UserError::EmailTaken);
        }

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(input.password_hash),
            full_name: Set(input.full_name),
            phone_number: Set(input.phone_number),
            building_id: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let user = user.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::EmailTaken
            } else {
                UserError::Database(e)
            }
        })?;

        let mut roles = input.roles;
        roles.sort();
        roles.dedup();
        for role in roles {
            insert_role(&txn, user.id, role).await?;
        }

        txn.commit().await?;
        tracing::info!(user_id = %user.id, "User created");

        Ok(user)
    }

    /// Roles held by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, DbErr> {
        roles_of(&self.db, user_id).await
    }

    /// Loads the request principal for an active user.
    ///
    /// Returns `None` for unknown or deactivated accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_principal(&self, user_id: Uuid) -> Result<Option<Principal>, DbErr> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }
        let roles = self.roles_of(user_id).await?;

        Ok(Some(Principal {
            user_id: user.id,
            full_name: user.full_name,
            email: user.email,
            roles,
            building_id: user.building_id,
        }))
    }

    /// Grants a role. Granting a role the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist.
    pub async fn add_role(&self, user_id: Uuid, role: Role) -> Result<(), UserError> {
        if self.find_by_id(user_id).await?.is_none() {
            return Err(UserError::NotFound);
        }
        if self.roles_of(user_id).await?.contains(&role) {
            return Ok(());
        }
        insert_role(&self.db, user_id, role).await?;
        tracing::info!(user_id = %user_id, role = %role, "Role granted");
        Ok(())
    }

    /// Users holding `role`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn with_role(&self, role: Role) -> Result<Vec<users::Model>, DbErr> {
        let ids: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::Role.eq(RoleName::from(role)))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();

        users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await
    }

    /// Self-registered users who have not been approved as owners yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn pending_owners(&self) -> Result<Vec<users::Model>, DbErr> {
        let owners: Vec<Uuid> = self
            .with_role(Role::Owner)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        Ok(self
            .with_role(Role::User)
            .await?
            .into_iter()
            .filter(|u| !owners.contains(&u.id))
            .collect())
    }

    /// Makes an owner the president of a building.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when the user or building is missing, the user is
    /// already a president or not an owner, or the building has a president.
    pub async fn assign_president(
        &self,
        user_id: Uuid,
        building_id: Uuid,
    ) -> Result<users::Model, UserError> {
        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(UserError::NotFound)?;
        let roles = roles_of(&txn, user_id).await?;
        if roles.contains(&Role::President) {
            return Err(UserError::AlreadyPresident);
        }
        if !roles.contains(&Role::Owner) {
            return Err(UserError::NotAnOwner);
        }
        if buildings::Entity::find_by_id(building_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(UserError::BuildingNotFound);
        }

        let presidents: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::Role.eq(RoleName::President))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        let taken = users::Entity::find()
            .filter(users::Column::Id.is_in(presidents))
            .filter(users::Column::BuildingId.eq(building_id))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(UserError::BuildingHasPresident);
        }

        insert_role(&txn, user_id, Role::President).await?;
        let mut active: users::ActiveModel = user.into();
        active.building_id = Set(Some(building_id));
        active.updated_at = Set(chrono::Utc::now().into());
        let user = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(user_id = %user_id, building_id = %building_id, "President assigned");

        Ok(user)
    }

    /// Every user except `exclude`, with ownership and billing figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_summaries(&self, exclude: Uuid) -> Result<Vec<UserSummary>, DbErr> {
        let users = users::Entity::find()
            .filter(users::Column::Id.ne(exclude))
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await?;

        let mut roles: HashMap<Uuid, Vec<Role>> = HashMap::new();
        for r in user_roles::Entity::find().all(&self.db).await? {
            roles.entry(r.user_id).or_default().push(r.role.into());
        }

        let buildings: HashMap<Uuid, buildings::Model> = buildings::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let flats = flats::Entity::find()
            .filter(flats::Column::OwnerId.is_not_null())
            .all(&self.db)
            .await?;
        let flat_owner: HashMap<Uuid, Uuid> = flats
            .iter()
            .filter_map(|f| f.owner_id.map(|o| (f.id, o)))
            .collect();

        let mut flat_counts: HashMap<Uuid, u64> = HashMap::new();
        for owner in flat_owner.values() {
            *flat_counts.entry(*owner).or_default() += 1;
        }

        let mut tenant_counts: HashMap<Uuid, u64> = HashMap::new();
        for t in tenants::Entity::find()
            .filter(tenants::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
        {
            if let Some(owner) = flat_owner.get(&t.flat_id) {
                *tenant_counts.entry(*owner).or_default() += 1;
            }
        }

        let mut outstanding: HashMap<Uuid, (u64, Decimal)> = HashMap::new();
        for a in expense_allocations::Entity::find()
            .filter(expense_allocations::Column::IsPaid.eq(false))
            .all(&self.db)
            .await?
        {
            let entry = outstanding.entry(a.owner_id).or_default();
            entry.0 += 1;
            entry.1 += a.amount_due;
        }

        Ok(users
            .into_iter()
            .map(|u| {
                let building = u.building_id.and_then(|id| buildings.get(&id));
                let (outstanding_bills, outstanding_amount) =
                    outstanding.get(&u.id).copied().unwrap_or_default();
                let mut held = roles.remove(&u.id).unwrap_or_default();
                held.sort();
                UserSummary {
                    id: u.id,
                    flat_count: flat_counts.get(&u.id).copied().unwrap_or(0),
                    active_tenant_count: tenant_counts.get(&u.id).copied().unwrap_or(0),
                    building_name: building.map(|b| b.name.clone()),
                    building_address: building.and_then(|b| b.address.clone()),
                    roles: held,
                    outstanding_bills,
                    outstanding_amount,
                    email: u.email,
                    full_name: u.full_name,
                    phone_number: u.phone_number,
                    is_active: u.is_active,
                }
            })
            .collect())
    }
}

async fn roles_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Role>, DbErr> {
    let mut roles: Vec<Role> = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.role.into())
        .collect();
    roles.sort();
    Ok(roles)
}

async fn insert_role<C: ConnectionTrait>(conn: &C, user_id: Uuid, role: Role) -> Result<(), DbErr> {
    user_roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role: Set(role.into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
