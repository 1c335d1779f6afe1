//! Application configuration management.
//!
//! Values are layered: `config/default.toml`, then `config/{RUN_MODE}.toml`,
//! then environment variables such as `AMS__DATABASE__URL`.

use serde::Deserialize;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "AMS";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Initial super admin account.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            json_logs: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on server start.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

impl JwtSettings {
    /// Converts the raw settings into the token service configuration.
    #[must_use]
    pub fn to_jwt_config(&self) -> crate::jwt::JwtConfig {
        crate::jwt::JwtConfig {
            secret: self.secret.clone(),
            access_token_expires_minutes: i64::try_from(self.access_token_expiry_secs / 60)
                .unwrap_or(i64::MAX),
            refresh_token_expires_days: i64::try_from(self.refresh_token_expiry_secs / 86_400)
                .unwrap_or(i64::MAX),
        }
    }
}

/// Super admin account created on first start when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Login email of the super admin.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Initial password. Bootstrap is skipped when empty.
    #[serde(default)]
    pub admin_password: String,
    /// Display name of the super admin.
    #[serde(default = "default_admin_name")]
    pub admin_full_name: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: String::new(),
            admin_full_name: default_admin_name(),
        }
    }
}

fn default_admin_email() -> String {
    "superadmin@ams.com".to_string()
}

fn default_admin_name() -> String {
    "Super Admin".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
