//! Error types for record store operations.
//!
//! Storage failures are never retried; callers map every variant to a server
//! error. The read-back variant exists so the API can report that a row was
//! written but could not be confirmed.

use thiserror::Error;

use crate::models::SubmissionId;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for record store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("{0}")]
    Database(String),

    /// Entity not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Row was inserted but re-reading it failed.
    ///
    /// The row stays in the table even though the caller sees an error.
    #[error("submission {id} was inserted but could not be read back: {message}")]
    InsertedRecordUnavailable {
        /// Identifier returned by the insert
        id: SubmissionId,
        /// Underlying failure description
        message: String,
    },
}

impl CoreError {
    /// Returns true when the row may already be persisted.
    pub fn is_read_back_failure(&self) -> bool {
        matches!(self, Self::InsertedRecordUnavailable { .. })
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                Self::NotFound("requested submission not found".to_string())
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = CoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn pool_errors_map_to_database() {
        let err = CoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, CoreError::Database(_)));
        assert!(!err.is_read_back_failure());
    }

    #[test]
    fn read_back_failure_names_the_id() {
        let err = CoreError::InsertedRecordUnavailable {
            id: SubmissionId(42),
            message: "connection reset".to_string(),
        };

        assert!(err.is_read_back_failure());
        assert_eq!(
            err.to_string(),
            "submission 42 was inserted but could not be read back: connection reset"
        );
    }
}
