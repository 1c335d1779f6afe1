//! First-start provisioning of the super admin account.

use ams_core::Role;
use ams_core::auth::{PasswordError, check_password_policy, hash_password};
use ams_shared::config::BootstrapConfig;
use sea_orm::{DatabaseConnection, DbErr};

use crate::repositories::{NewUser, UserError, UserRepository};

/// Errors raised while provisioning the super admin.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The configured password is unusable.
    #[error("bootstrap password rejected: {0}")]
    Password(#[from] PasswordError),

    /// Creating the account failed.
    #[error(transparent)]
    User(#[from] UserError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// What [`ensure_super_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No password configured.
    Skipped,
    /// An account with the email exists already.
    Existing,
    /// A new super admin was created.
    Created,
}

/// Creates the configured super admin unless an account with that email
/// already exists. An existing account is left untouched, whatever its roles.
///
/// # Errors
///
/// Returns `BootstrapError` if the password breaks the policy or the
/// database rejects the insert.
pub async fn ensure_super_admin(
    db: &DatabaseConnection,
    config: &BootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if config.admin_password.is_empty() {
        tracing::debug!("No bootstrap password configured, skipping super admin creation");
        return Ok(BootstrapOutcome::Skipped);
    }

    let users = UserRepository::new(db.clone());
    if users.email_exists(&config.admin_email).await? {
        return Ok(BootstrapOutcome::Existing);
    }

    check_password_policy(&config.admin_password)?;
    let user = users
        .create(NewUser {
            email: config.admin_email.clone(),
            password_hash: hash_password(&config.admin_password)?,
            full_name: config.admin_full_name.clone(),
            phone_number: None,
            roles: vec![Role::SuperAdmin],
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Super admin created");
    Ok(BootstrapOutcome::Created)
}
