//! Persistence layer: sqlx models, repositories, migrations, and the
//! in-transaction status propagation that follows every write.

use sqlx::postgres::PgPoolOptions;

pub mod error;
mod locks;
pub mod models;
pub mod propagation;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Apply all pending migrations embedded from `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Surface a domain decoding failure (e.g. an unknown status string) as a
/// sqlx decode error.
pub(crate) fn decode_err(err: taskfund_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
