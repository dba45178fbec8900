//! Pool construction and migration bootstrapping for the `SQLite` backend.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::migrations::{all_embedded_migrations, Migrator};

/// Open a pool against `path`, creating the file if needed, and run every
/// pending embedded migration.
pub async fn open(path: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Open an ephemeral in-memory database, migrated and ready to use.
/// Used by integration tests and the demo binary's quick-start mode.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new().filename(":memory:").create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let migrator = Migrator::new(pool.clone());
    migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))?;
    Ok(())
}
