//! # Persistence Errors
//!
//! Every fallible call in this crate returns `DbResult`, and every sqlx
//! failure is folded into `DbError` on the way out.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error (driver)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module)     categorized, SQLite messages parsed          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in apps/server) status code + JSON body                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// What a repository call can fail with.
///
/// Categorized so the HTTP layer can tell "you asked for something that
/// isn't there" (client's problem) from "the database is unhappy" (ours).
#[derive(Debug, Error)]
pub enum DbError {
    /// The row named by the caller does not exist. Raised when a lookup
    /// comes back empty or an UPDATE/DELETE touches zero rows.
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// A UNIQUE index rejected the write, e.g. a duplicate product code
    /// or username. `field` is `table.column` as reported by SQLite.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// A referential constraint rejected the write. The shipped schema
    /// declares no foreign keys, so this arrives only once a migration
    /// adds one.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// Could not open or reach the database file.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A migration could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for any non-constraint reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin, commit, or roll back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// All pooled connections are busy and the acquire timed out.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits none of the above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand used by repositories after an empty lookup.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a duplicate-key rejection.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the error means "the row you named does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Folds sqlx errors into `DbError`.
///
/// SQLite reports constraint failures as driver errors with well-known
/// message prefixes, so the categorization below is string matching:
///
/// ```text
/// RowNotFound                 → NotFound
/// "UNIQUE constraint failed"  → UniqueViolation (field parsed from message)
/// "FOREIGN KEY constraint.."  → ForeignKeyViolation
/// PoolTimedOut                → PoolExhausted
/// anything else               → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Shorthand result for everything in this crate.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", "abc-123");
        assert_eq!(err.to_string(), "Product not found: abc-123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_message() {
        let err = DbError::duplicate("products.code", "LC-001");
        assert_eq!(
            err.to_string(),
            "Duplicate products.code: 'LC-001' already exists"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_row_not_found_conversion() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }
}
