//! Postgres connection pool and schema bootstrap.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::repository::RepositoryError;

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Connect a pool to `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| RepositoryError::Storage(format!("failed to connect to database: {e}")))
}

/// Apply the embedded schema. Safe to run repeatedly.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::Storage(format!("failed to apply schema: {e}")))?;
    info!("database schema is up to date");
    Ok(())
}
