//! Error types for the persistence layer.

use thiserror::Error;

/// Result alias used by every store operation.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by [`crate::Database`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness (or other integrity) constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A filter or patch named a column the entity does not have.
    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn {
        table: &'static str,
        column: String,
    },

    /// Anything else the driver reports: connection loss, malformed SQL, decode errors.
    #[error(transparent)]
    Database(sqlx::Error),
}

impl StoreError {
    /// Whether this error came from a violated constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                StoreError::ConstraintViolation(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}
