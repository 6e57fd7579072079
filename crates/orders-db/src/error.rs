//! # Database Error Types
//!
//! Error types for repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)    ValidationError (orders-core)           │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  StoreError ← Categorizes the underlying failure                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RepositoryError ← Adds the operation and the entity involved          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller                                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lookup that finds nothing is not an error: it returns `Ok(None)`.

use thiserror::Error;

use orders_core::ValidationError;

// =============================================================================
// Store Error
// =============================================================================

/// Categorized storage failure.
///
/// Always carried as the cause of a [`RepositoryError`], never returned
/// on its own by the public API.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique / primary key constraint violation.
    ///
    /// ## When This Occurs
    /// - Adding an order whose id already exists
    /// - Two positions with the same name in one order
    #[error("Duplicate key: {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Opening the connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN, COMMIT or ROLLBACK failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The order was rejected before any statement ran.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::Io             → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>, ..."
                // FK constraint: "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    StoreError::UniqueViolation {
                        field: field.to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::Io(io_err) => StoreError::ConnectionFailed(io_err.to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

// =============================================================================
// Repository Error
// =============================================================================

/// The single error kind returned by repositories.
///
/// Carries a human-readable message naming the operation and the entity
/// involved, plus every underlying failure that was captured. Closing a
/// unit-of-work can collect two causes (a failed commit and a failed
/// connection close); everything else carries at most one.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
    #[source]
    cause: Option<StoreError>,
    further_causes: Vec<StoreError>,
}

impl RepositoryError {
    /// Creates an error without an underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        RepositoryError {
            message: message.into(),
            cause: None,
            further_causes: Vec::new(),
        }
    }

    /// Creates an error wrapping one cause.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<StoreError>) -> Self {
        RepositoryError {
            message: message.into(),
            cause: Some(cause.into()),
            further_causes: Vec::new(),
        }
    }

    /// Creates an error wrapping all of `causes`, the first one becoming
    /// the [`std::error::Error::source`].
    pub fn with_causes(message: impl Into<String>, causes: Vec<StoreError>) -> Self {
        let mut causes = causes.into_iter();
        RepositoryError {
            message: message.into(),
            cause: causes.next(),
            further_causes: causes.collect(),
        }
    }

    /// Prefixes the message with an outer operation, keeping the causes.
    pub fn context(mut self, outer: impl AsRef<str>) -> Self {
        self.message = format!("{}: {}", outer.as_ref(), self.message);
        self
    }

    /// The message without the causes.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every captured cause, in the order they happened.
    pub fn causes(&self) -> impl Iterator<Item = &StoreError> {
        self.cause.iter().chain(self.further_causes.iter())
    }

    /// Takes every captured cause, in the order they happened.
    pub fn into_causes(self) -> Vec<StoreError> {
        self.cause.into_iter().chain(self.further_causes).collect()
    }

    /// Whether the failure was a rejected order rather than a storage error.
    pub fn is_validation(&self) -> bool {
        matches!(self.cause, Some(StoreError::Validation(_)))
    }
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Attaches repository context to a lower-level failure.
///
/// ```rust,ignore
/// sqlx::query("DELETE FROM Orders WHERE id = ?1")
///     .bind(id)
///     .execute(&mut *conn)
///     .await
///     .context(|| format!("error deleting order {id}"))?;
/// ```
pub trait ResultExt<T> {
    fn context<F>(self, message: F) -> RepoResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<StoreError>,
{
    fn context<F>(self, message: F) -> RepoResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| RepositoryError::with_cause(message(), e))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_message_and_source() {
        let err = RepositoryError::with_cause(
            "error deleting order 3",
            StoreError::QueryFailed("disk I/O error".to_string()),
        );

        assert_eq!(err.to_string(), "error deleting order 3");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Query failed: disk I/O error".to_string())
        );
    }

    #[test]
    fn test_with_causes_keeps_all() {
        let err = RepositoryError::with_causes(
            "closing unit of work",
            vec![
                StoreError::TransactionFailed("commit".to_string()),
                StoreError::ConnectionFailed("close".to_string()),
            ],
        );

        assert_eq!(err.causes().count(), 2);
        assert_eq!(err.into_causes().len(), 2);
    }

    #[test]
    fn test_with_causes_first_is_source() {
        let err = RepositoryError::with_causes(
            "closing unit of work",
            vec![
                StoreError::TransactionFailed("commit".to_string()),
                StoreError::ConnectionFailed("close".to_string()),
            ],
        );

        assert!(matches!(
            err.source().and_then(|s| s.downcast_ref::<StoreError>()),
            Some(StoreError::TransactionFailed(_))
        ));
    }

    #[test]
    fn test_context_prefixes_message() {
        let err = RepositoryError::new("error adding order 1").context("error updating order 1");
        assert_eq!(err.message(), "error updating order 1: error adding order 1");
        assert_eq!(err.causes().count(), 0);
    }

    #[test]
    fn test_validation_cause() {
        let err = RepositoryError::with_cause(
            "error adding order 1",
            ValidationError::Required {
                field: "name".to_string(),
            },
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_result_ext() {
        let res: Result<(), StoreError> = Err(StoreError::Internal("boom".to_string()));
        let err = res.context(|| "error counting positions".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "error counting positions");
        assert_eq!(err.causes().count(), 1);
    }
}
