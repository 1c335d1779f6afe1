//! Authorization rules.
//!
//! Every handler asks the same few questions about the caller: which roles
//! they hold, which building they manage, and whether they own a flat.
//! [`Principal`] answers them in one place.

use ams_shared::AppError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Role;

/// The authenticated caller, loaded from storage for each request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    /// User ID.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Held roles.
    pub roles: Vec<Role>,
    /// Building assigned to a president.
    pub building_id: Option<Uuid>,
}

/// Which buildings a listing query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingScope {
    /// No filter.
    All,
    /// A single building.
    Only(Uuid),
    /// Nothing at all; the caller has no building.
    Nothing,
}

/// Authorization failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The caller holds none of the required roles.
    #[error("requires one of: {0}")]
    MissingRole(String),

    /// The target belongs to a building the caller does not manage.
    #[error("you are not authorized to manage this building")]
    OtherBuilding,

    /// The caller does not own the flat.
    #[error("you do not own this flat")]
    NotFlatOwner,
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl Principal {
    /// Returns true if the caller holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true for super admins.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }

    /// Requires at least one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingRole` listing the accepted roles.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AccessError> {
        if roles.iter().any(|r| self.has_role(*r)) {
            return Ok(());
        }
        let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(AccessError::MissingRole(names.join(", ")))
    }

    /// Super admins manage every building, presidents only their own.
    ///
    /// # Errors
    ///
    /// `MissingRole` for callers who are neither; `OtherBuilding` for a
    /// president of a different building.
    pub fn ensure_manages_building(&self, building_id: Uuid) -> Result<(), AccessError> {
        self.require_any(&[Role::SuperAdmin, Role::President])?;
        if self.is_super_admin() || self.building_id == Some(building_id) {
            Ok(())
        } else {
            Err(AccessError::OtherBuilding)
        }
    }

    /// Weaker than [`Self::ensure_manages_building`]: any user assigned to
    /// the building passes, whatever their role.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::OtherBuilding` otherwise.
    pub fn ensure_in_building(&self, building_id: Uuid) -> Result<(), AccessError> {
        if self.is_super_admin() || self.building_id == Some(building_id) {
            Ok(())
        } else {
            Err(AccessError::OtherBuilding)
        }
    }

    /// Passes for the flat's owner and for super admins.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFlatOwner` otherwise, including for flats
    /// that have no owner.
    pub fn ensure_owns_flat(&self, owner_id: Option<Uuid>) -> Result<(), AccessError> {
        if self.is_super_admin() || owner_id == Some(self.user_id) {
            Ok(())
        } else {
            Err(AccessError::NotFlatOwner)
        }
    }

    /// Building filter for listings open to every authenticated user.
    #[must_use]
    pub fn building_scope(&self) -> BuildingScope {
        if self.is_super_admin() {
            BuildingScope::All
        } else {
            self.building_id
                .map_or(BuildingScope::Nothing, BuildingScope::Only)
        }
    }

    /// Building filter for management listings (buildings, bills).
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingRole` unless the caller is a super admin
    /// or president.
    pub fn managed_scope(&self) -> Result<BuildingScope, AccessError> {
        self.require_any(&[Role::SuperAdmin, Role::President])?;
        Ok(self.building_scope())
    }
}

impl BuildingScope {
    /// Returns true if `building_id` passes the filter.
    #[must_use]
    pub fn allows(&self, building_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => *id == building_id,
            Self::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[Role], building_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            full_name: "Test".into(),
            email: "t@ams.com".into(),
            roles: roles.to_vec(),
            building_id,
        }
    }

    #[test]
    fn test_president_cannot_manage_other_building() {
        let own = Uuid::new_v4();
        let president = principal(&[Role::President, Role::Owner], Some(own));

        assert!(president.ensure_manages_building(own).is_ok());
        assert_eq!(
            president.ensure_manages_building(Uuid::new_v4()),
            Err(AccessError::OtherBuilding)
        );
    }

    #[test]
    fn test_super_admin_manages_everything() {
        let admin = principal(&[Role::SuperAdmin], None);
        assert!(admin.ensure_manages_building(Uuid::new_v4()).is_ok());
        assert!(admin.ensure_owns_flat(None).is_ok());
        assert_eq!(admin.building_scope(), BuildingScope::All);
    }

    #[test]
    fn test_owner_cannot_manage_even_with_building() {
        let building = Uuid::new_v4();
        let owner = principal(&[Role::Owner], Some(building));
        assert!(matches!(
            owner.ensure_manages_building(building),
            Err(AccessError::MissingRole(_))
        ));
        assert!(owner.ensure_in_building(building).is_ok());
    }

    #[test]
    fn test_flat_ownership() {
        let owner = principal(&[Role::Owner], None);
        assert!(owner.ensure_owns_flat(Some(owner.user_id)).is_ok());
        assert_eq!(
            owner.ensure_owns_flat(Some(Uuid::new_v4())),
            Err(AccessError::NotFlatOwner)
        );
        assert_eq!(owner.ensure_owns_flat(None), Err(AccessError::NotFlatOwner));
    }

    #[test]
    fn test_scopes() {
        let building = Uuid::new_v4();
        let president = principal(&[Role::President], Some(building));
        assert_eq!(president.building_scope(), BuildingScope::Only(building));
        assert!(president.building_scope().allows(building));
        assert!(!president.building_scope().allows(Uuid::new_v4()));

        let unassigned = principal(&[Role::Owner], None);
        assert_eq!(unassigned.building_scope(), BuildingScope::Nothing);
        assert!(unassigned.managed_scope().is_err());
    }

    #[test]
    fn test_missing_role_message_lists_roles() {
        let user = principal(&[Role::User], None);
        let err = user
            .require_any(&[Role::SuperAdmin, Role::President])
            .unwrap_err();
        assert_eq!(err.to_string(), "requires one of: SuperAdmin, President");
        assert_eq!(AppError::from(err).status_code(), 403);
    }
}
