//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically

use crate::config::Config;
use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// The pool is shared by every in-flight request, so its size is the upper
/// bound on how many store operations run at once.
///
/// # Configuration
///
/// - Maximum connections: `DB_MAX_CONNECTIONS`
/// - Idle connections are closed after `DB_IDLE_TIMEOUT_SECS` (0 keeps them forever)
/// - Waiting for a free connection is bounded by `DB_ACQUIRE_TIMEOUT_SECS`
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(database_url: &str, config: &Config) -> Result<DbPool, sqlx::Error> {
    let idle_timeout = (config.db_idle_timeout_secs > 0).then(|| config.idle_timeout());

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .idle_timeout(idle_timeout)
        .acquire_timeout(config.acquire_timeout())
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each one runs only once.
///
/// # Errors
///
/// Returns an error if:
/// - SQL syntax errors in migration files
/// - Database errors during migration execution
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro embeds ./migrations at compile time
    sqlx::migrate!("./migrations").run(pool).await
}
