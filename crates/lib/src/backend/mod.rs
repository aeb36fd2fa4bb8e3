//! Storage backends for wikilog
//!
//! This module provides the core `Storage` trait and its implementations,
//! organized by category (local file, network).
//!
//! The `Storage` trait defines the interface for users, sessions and per-user resources.
//! Callers are written against the trait only; which implementation sits behind it is
//! decided once by the [`selector`](crate::selector).

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

mod errors;
mod file;
pub mod network;
mod resource;

pub use errors::BackendError;
pub use file::FileStorage;
pub use network::{RedisUrlStorage, RestStorage};
pub use resource::Resource;

/// Which implementation sits behind a `Storage` handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// JSON documents under a local directory
    File,
    /// Redis server reached through a `redis://` URL
    RedisUrl,
    /// Token-authenticated REST key-value store
    Rest,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendKind::File => "file",
            BackendKind::RedisUrl => "redis-url",
            BackendKind::Rest => "rest",
        };
        f.write_str(label)
    }
}

/// Storage trait abstracting where users, sessions and per-user resources live.
///
/// Every implementation must produce the same observable behavior:
///
/// * Absence is never an error. Unknown users and sessions are `None`, and a
///   resource that was never saved reads as an empty list.
/// * Stored resource data that is not a JSON array (corrupt text, an object, ...)
///   reads as an empty list instead of failing.
/// * Saving a value that is not a JSON array is silently ignored and leaves the
///   stored value untouched.
/// * Errors are reserved for transport, I/O and configuration failures. No
///   operation is retried.
///
/// Implementations must be `Send` and `Sync`; one instance is shared by every
/// request handler for the lifetime of the process.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Identifies the implementation, for logging and diagnostics.
    fn kind(&self) -> BackendKind;

    /// Password hash stored for `username`, or `None`.
    async fn get_user(&self, username: &str) -> Result<Option<String>>;

    /// Stores `password_hash` for `username`, replacing any previous value.
    async fn set_user(&self, username: &str, password_hash: &str) -> Result<()>;

    /// Whether `username` has a stored password hash.
    async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_user(username).await?.is_some())
    }

    /// All users as `username -> password hash`. Empty when nothing is stored.
    ///
    /// Meant for administrative enumeration only.
    async fn get_all_users(&self) -> Result<HashMap<String, String>>;

    /// Associates `session_id` with `username`.
    async fn set_session(&self, session_id: &str, username: &str) -> Result<()>;

    /// Username owning `session_id`, or `None` when not logged in.
    async fn get_session(&self, session_id: &str) -> Result<Option<String>>;

    /// Removes `session_id`. Removing an unknown session is not an error.
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Items stored for `username` under `resource`.
    ///
    /// Returns an empty list when nothing is stored or the stored data is not a list.
    async fn get_list(&self, resource: Resource, username: &str) -> Result<Vec<Value>>;

    /// Replaces the items stored for `username` under `resource`.
    ///
    /// A no-op when `items` is not a JSON array.
    async fn save_list(&self, resource: Resource, username: &str, items: &Value) -> Result<()>;

    /// Article read log.
    async fn get_log(&self, username: &str) -> Result<Vec<Value>> {
        self.get_list(Resource::Log, username).await
    }

    async fn save_log(&self, username: &str, log: &Value) -> Result<()> {
        self.save_list(Resource::Log, username, log).await
    }

    /// Custom links added by the user.
    async fn get_user_links(&self, username: &str) -> Result<Vec<Value>> {
        self.get_list(Resource::UserLinks, username).await
    }

    async fn save_user_links(&self, username: &str, links: &Value) -> Result<()> {
        self.save_list(Resource::UserLinks, username, links).await
    }

    /// Named lists of links.
    async fn get_link_lists(&self, username: &str) -> Result<Vec<Value>> {
        self.get_list(Resource::LinkLists, username).await
    }

    async fn save_link_lists(&self, username: &str, link_lists: &Value) -> Result<()> {
        self.save_list(Resource::LinkLists, username, link_lists).await
    }

    /// Saved filter presets.
    async fn get_presets(&self, username: &str) -> Result<Vec<Value>> {
        self.get_list(Resource::Presets, username).await
    }

    async fn save_presets(&self, username: &str, presets: &Value) -> Result<()> {
        self.save_list(Resource::Presets, username, presets).await
    }

    /// Items the user is currently reading.
    async fn get_currently_reading(&self, username: &str) -> Result<Vec<Value>> {
        self.get_list(Resource::CurrentlyReading, username).await
    }

    async fn save_currently_reading(&self, username: &str, items: &Value) -> Result<()> {
        self.save_list(Resource::CurrentlyReading, username, items).await
    }
}
