//! Error types for Store operations.

use std::fmt;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a [`super::Store`] implementation.
#[derive(Debug)]
pub enum StoreError {
    /// The referenced project or check row does not exist.
    NotFound(String),

    /// An optimistic compare-and-swap write lost a race (§5, §7 "conflict").
    Conflict,

    /// Database connection failed.
    ConnectionFailed(String),

    /// Query or migration execution failed.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::Conflict => write!(f, "optimistic concurrency conflict"),
            StoreError::ConnectionFailed(msg) => write!(f, "failed to connect to store: {msg}"),
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(format!("migration failed: {err}"))
    }
}
