//! Apartment management API server.
//!
//! Main entry point for the backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ams_api::{AppState, create_router};
use ams_db::migration::MigratorTrait;
use ams_db::{BootstrapOutcome, Migrator, connect, ensure_super_admin};
use ams_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ams=debug,ams_api=debug,ams_db=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.server.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("Failed to apply migrations")?;
        info!("Migrations applied");
    }

    match ensure_super_admin(&db, &config.bootstrap).await? {
        BootstrapOutcome::Created => {
            info!(email = %config.bootstrap.admin_email, "Super admin provisioned");
        }
        BootstrapOutcome::Existing => {
            info!(email = %config.bootstrap.admin_email, "Super admin already present");
        }
        BootstrapOutcome::Skipped => {}
    }

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(config.jwt.to_jwt_config())),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
