//!
//! wikilog: portable persistence for the reading tracker.
//! This library provides the storage contract and its backends, the backend selector,
//! and the account layer built on top of them.
//!
//! ## Core Concepts
//!
//! * **Storage (`backend::Storage`)**: The capability contract. Users, sessions, and five
//!   per-user JSON-array resources, with identical semantics on every backend.
//! * **Backends**: Interchangeable implementations of the contract:
//!     * **FileStorage (`backend::FileStorage`)**: JSON documents in a local directory tree.
//!     * **RedisUrlStorage (`backend::network::RedisUrlStorage`)**: A Redis server reached through a `redis://` URL.
//!     * **RestStorage (`backend::network::RestStorage`)**: An Upstash-style REST key-value store authenticated by token.
//! * **Selector (`selector`)**: Picks exactly one backend from the environment at process start.
//! * **Accounts (`accounts::Accounts`)**: Registration, login, and session verification on top of `Storage`.
//!
//! Absence is never an error: missing users and sessions are `None`, missing or corrupt
//! resources read as an empty list. Errors are reserved for transport, I/O and configuration failures.

pub mod accounts;
pub mod backend;
pub mod config;
pub mod constants;
pub mod selector;

pub use backend::{BackendKind, Resource, Storage};
pub use config::{Env, ProcessEnv};
pub use selector::{BackendPlan, plan, select};

/// Result type used throughout the wikilog library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the wikilog library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured account errors from the accounts module
    #[error(transparent)]
    Account(accounts::AccountError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Account(_) => "accounts",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is a storage configuration problem.
    ///
    /// Configuration errors are fatal at startup; the message carries the remediation hint.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error came from talking to the storage service or filesystem.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_transport_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Account(account_err) => account_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is caused by caller input rather than storage.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Account(account_err) => account_err.is_validation_error(),
            _ => false,
        }
    }
}
