//! Backend error types for shelf-layout storage.
//!
//! This module defines structured error types for backend operations,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error;

/// Database error codes that a retry can clear: SQLite BUSY and LOCKED with
/// their extended codes, Postgres serialization failure and deadlock.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
const TRANSIENT_SQL_CODES: &[&str] = &[
    "5", "261", "517", "773", "6", "262", "40001", "40P01",
];

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// A document with the same business key already exists in the collection.
    #[error("Duplicate key '{key}' in collection '{collection}'")]
    DuplicateKey {
        /// The collection written to
        collection: String,
        /// The conflicting business key
        key: String,
    },

    /// A read-modify-write kept losing against concurrent writers.
    #[error("Write conflict in collection '{collection}' after {attempts} attempts")]
    WriteConflict {
        /// The collection written to
        collection: String,
        /// How many times the write was tried
        attempts: usize,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored data does not have the expected shape.
    #[error("Backend state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the state inconsistency
        reason: String,
    },

    /// SQL database operation failed.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description including the failed operation
        reason: String,
        /// The underlying sqlx error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error is a uniqueness violation.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, BackendError::DuplicateKey { .. })
    }

    /// Check if this error comes from concurrent modification.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::WriteConflict { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if retrying the failed write may succeed.
    ///
    /// True for write conflicts and for database lock, busy and serialization
    /// failures.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::WriteConflict { .. } => true,
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            BackendError::SqlxError {
                source: Some(sqlx::Error::Database(db_err)),
                ..
            } => db_err
                .code()
                .is_some_and(|code| TRANSIENT_SQL_CODES.iter().any(|c| *c == code)),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::StateInconsistency { .. })
    }

    /// Get the collection this error refers to, if any.
    pub fn collection(&self) -> Option<&str> {
        match self {
            BackendError::DuplicateKey { collection, .. }
            | BackendError::WriteConflict { collection, .. } => Some(collection),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
