//! Storage error types for the wikilog backends.
//!
//! Only failures live here. Absent users, sessions and resources are
//! reported through `Option`/empty values, never through these variants.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// No usable storage configuration was found where one is required.
    #[error("Storage configuration error: {reason}")]
    Configuration {
        /// What is missing and how to fix it
        reason: String,
    },

    /// File I/O error.
    #[error("File I/O error at {}", path.display())]
    FileIo {
        /// The file or directory being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Redis connection or command failed.
    #[error("Redis error: {reason}")]
    Redis {
        /// What was being attempted
        reason: String,
        /// The underlying client error
        #[source]
        source: redis::RedisError,
    },

    /// The REST endpoint could not be reached or answered with a failure status.
    #[error("REST storage request failed: {reason}")]
    Rest {
        /// What went wrong
        reason: String,
        /// The underlying HTTP client error, if any
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The REST endpoint rejected a command.
    #[error("REST storage rejected {command}: {message}")]
    RestCommand {
        /// The command name, e.g. `HGET`
        command: String,
        /// The error message returned by the service
        message: String,
    },

    /// The REST endpoint returned a result of an unexpected shape.
    #[error("Unexpected REST storage response to {command}: {reason}")]
    UnexpectedResponse {
        /// The command name
        command: String,
        /// Description of the mismatch
        reason: String,
    },
}

impl BackendError {
    /// Check if this error is a configuration problem.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, BackendError::Configuration { .. })
    }

    /// Check if this error is a transport or I/O failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::Redis { .. }
                | BackendError::Rest { .. }
                | BackendError::RestCommand { .. }
                | BackendError::UnexpectedResponse { .. }
        )
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
