//! Postgres persistence for flood reports, alerts and evacuation shelters.

pub mod models;
pub mod repositories;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Pool options shared by [`create_pool`] and [`create_lazy_pool`].
///
/// `acquire_timeout` bounds how long a query waits for a connection while
/// the database is down.
pub fn pool_options(acquire_timeout: Duration) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(acquire_timeout)
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    pool_options(acquire_timeout).connect(database_url).await
}

/// Create a pool that defers connecting until the first query.
///
/// Used when the database is optional for startup (e.g. tests that only
/// exercise the proxy routes).
pub fn create_lazy_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    pool_options(acquire_timeout).connect_lazy(database_url)
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
