//! Persistence
//!
//! Audits and users are reached through the [`AuditStore`] and [`UserStore`]
//! traits. [`audits::PgAuditStore`] and [`users::PgUserStore`] back them with
//! PostgreSQL; [`memory`] holds process-local versions for tests and
//! database-less runs.

pub mod audits;
pub mod memory;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use audits::{AuditSort, AuditStore, PgAuditStore, SortField, SortOrder};
pub use memory::{MemoryAuditStore, MemoryUserStore};
pub use users::{PgUserStore, UserStore};

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record already exists (unique constraint violation)
    #[error("{0}")]
    Duplicate(String),

    /// A stored row could not be mapped back onto the domain model
    #[error("Stored record is malformed: {0}")]
    Corrupt(String),
}

impl DbError {
    pub fn not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource_type, identifier))
    }

    pub fn duplicate(resource_type: &str, identifier: &str) -> Self {
        Self::Duplicate(format!("{} '{}' already exists", resource_type, identifier))
    }

    pub fn corrupt(message: impl std::fmt::Display) -> Self {
        Self::Corrupt(message.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// True when `error` is a unique constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}
