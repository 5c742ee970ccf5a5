//! Postgres pool and schema migrations

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use studyvault_core::Config;

/// Connect the pool, then bring the `submissions` schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = connect(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect(config: &Config) -> Result<PgPool> {
    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_secs = config.db_timeout_seconds(),
        "Connecting to database"
    );
    PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = Migrator::new(dir.as_path())
        .await
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
    let known = migrator.iter().count();
    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(migrations = known, "Database schema up to date");
    Ok(())
}
