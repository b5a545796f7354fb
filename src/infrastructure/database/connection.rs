//! PostgreSQL connection pool.
//!
//! Grounded on `original_source/db/pool.py`'s parameters (pool_size=10,
//! max_overflow=20 => an effective ceiling of 30, pool_timeout=30,
//! pool_recycle=3600, pool_pre_ping) and the teacher's
//! `adapters::sqlite::connection::create_pool` shape, ported to
//! `sqlx::PgPoolOptions`. Tuning the pool itself is an external
//! operational concern; this just establishes it with sane defaults.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::infrastructure::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to create connection pool: {0}")]
    PoolCreationFailed(String),
    #[error("database url is invalid: {0}")]
    InvalidDatabaseUrl(String),
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, ConnectionError> {
    if !config.url.starts_with("postgres://") && !config.url.starts_with("postgresql://") {
        return Err(ConnectionError::InvalidDatabaseUrl(config.url.clone()));
    }

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| ConnectionError::PoolCreationFailed(e.to_string()))
}

pub async fn verify_connection(pool: &PgPool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| ConnectionError::PoolCreationFailed(e.to_string()))?;
    Ok(())
}
