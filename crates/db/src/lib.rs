//! PostgreSQL persistence for post revision history.
//!
//! - [`repositories`] -- zero-sized repos issuing raw `sqlx` queries.
//! - [`backend`] -- [`PgRevisionBackend`] and [`PgPostStore`], the storage
//!   traits from `folio-core` implemented over those repos.

pub mod backend;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use backend::{storage_error, PgPostStore, PgRevisionBackend};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
