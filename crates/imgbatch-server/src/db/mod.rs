//! MySQL connection pool lifecycle
//!
//! The pool is opened once in `main`, handed to the store by value (it is a
//! cheap handle) and closed explicitly during shutdown.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database configuration error: {0}. Check DB_HOST, DB_USER, DB_PASSWORD and DB_NAME.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Build driver connect options from the configured parts
pub fn connect_options(config: &DatabaseConfig) -> DbResult<MySqlConnectOptions> {
    if config.host.trim().is_empty() {
        return Err(DbError::Config("database host is empty".to_string()));
    }
    if config.name.trim().is_empty() {
        return Err(DbError::Config("database name is empty".to_string()));
    }

    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name);

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    Ok(options)
}

pub async fn create_pool(config: &DatabaseConfig) -> DbResult<MySqlPool> {
    let options = connect_options(config)?;

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &MySqlPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}
