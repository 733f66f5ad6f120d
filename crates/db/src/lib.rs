//! Persistence for wiki documents, revisions, zones and users, plus the
//! request-facing helpers that load records and hand them to `wiki-core`.

pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

use crate::config::DbConfig;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
