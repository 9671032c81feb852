use std::sync::Arc;

use medstock_agent::DefaultAgent;
#[cfg(test)]
use medstock_core::config::LoadOptions;
use medstock_core::config::{AppConfig, ConfigError};
use medstock_db::{connect_with_settings, migrations, DbPool, SqlInventoryRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent: Arc<DefaultAgent<SqlInventoryRepository>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let agent =
        Arc::new(DefaultAgent::from_config(&config, SqlInventoryRepository::new(db_pool.clone())));
    info!(
        event_name = "system.bootstrap.agent_ready",
        correlation_id = "bootstrap",
        expiry_default_days = config.nlu.expiry_default_days,
        extra_items = config.nlu.extra_items.len(),
        max_sessions = config.server.max_sessions,
        session_idle_secs = config.server.session_idle_secs,
        "inventory agent initialized"
    );

    Ok(Application { config, db_pool, agent })
}
