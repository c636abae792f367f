//! Error types and result handling for storage and migration operations.
//!
//! Database failures are classified so the HTTP layer can map them to
//! client-facing statuses without inspecting driver errors itself.

use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// PostgreSQL `string_data_right_truncation`, raised when a value exceeds a
/// `VARCHAR(n)` bound.
const PG_STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Core error type for internal operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The entity is not in a state that allows the operation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Applying or reverting a migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {db_err}"))
            },
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::ConstraintViolation(format!("check constraint violation: {db_err}"))
            },
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(PG_STRING_DATA_RIGHT_TRUNCATION) =>
            {
                Self::ConstraintViolation(format!("value too long: {db_err}"))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}
