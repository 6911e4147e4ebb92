//! Custom error types for the common library
//!
//! This module defines the storage-level error types shared by every
//! Phono service that talks to PostgreSQL.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Whether the underlying driver error is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Query(SqlxError::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }

    /// Whether the underlying driver error is a foreign key violation
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            DatabaseError::Query(SqlxError::Database(db)) => db.is_foreign_key_violation(),
            _ => false,
        }
    }

    /// Name of the violated constraint, if the driver reported one
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DatabaseError::Query(SqlxError::Database(db)) => db.constraint(),
            _ => None,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_driver_errors_are_not_constraint_violations() {
        let err = DatabaseError::Configuration("bad url".to_string());
        assert!(!err.is_unique_violation());
        assert_eq!(err.constraint(), None);

        let err = DatabaseError::Query(SqlxError::RowNotFound);
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }

    #[test]
    fn test_error_messages() {
        let err = DatabaseError::Migration("checksum mismatch".to_string());
        assert_eq!(
            err.to_string(),
            "Database migration error: checksum mismatch"
        );
    }
}
