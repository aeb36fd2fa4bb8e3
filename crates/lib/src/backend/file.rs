//! File backend: JSON documents under a local directory.
//!
//! ```text
//! <base>/users.json              {"username": "password hash", ...}
//! <base>/sessions.json           {"session id": "username", ...}
//! <base>/<resource dir>/<username>.json   [ ... ]
//! ```
//!
//! Usernames are used as file names with `%`, `/`, `\` and NUL percent-encoded,
//! so any username maps to exactly one file inside its resource directory.
//! Non-string values in the users or sessions map are skipped on read and
//! preserved on write.
//!
//! Every write is a whole-document read-modify-write. There is no file locking:
//! two concurrent writers to the same document can lose an update.

use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::BackendError;
use super::resource::{Resource, decode_list};
use super::{BackendKind, Storage};
use crate::Result;
use crate::constants::{DEFAULT_DATA_DIR, SESSIONS_FILE, USERS_FILE};

/// Storage backed by JSON files for local development and offline use.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) a file store rooted at `base`.
    pub async fn open(base: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self { base: base.into() };
        storage.ensure_dirs().await?;
        Ok(storage)
    }

    /// Base directory used when nothing else is configured.
    pub fn default_dir() -> PathBuf {
        PathBuf::from(DEFAULT_DATA_DIR)
    }

    fn users_file(&self) -> PathBuf {
        self.base.join(USERS_FILE)
    }

    fn sessions_file(&self) -> PathBuf {
        self.base.join(SESSIONS_FILE)
    }

    /// Path of the document holding `resource` for `username`.
    pub fn resource_file(&self, resource: Resource, username: &str) -> PathBuf {
        self.base
            .join(resource.dir_name())
            .join(format!("{}.json", file_stem(username)))
    }

    /// Recreates the directory tree. Runs before every write so an externally
    /// deleted data directory comes back instead of failing.
    async fn ensure_dirs(&self) -> Result<()> {
        let dirs = std::iter::once(self.base.clone())
            .chain(Resource::ALL.into_iter().map(|r| self.base.join(r.dir_name())));
        for dir in dirs {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| BackendError::FileIo { path: dir, source })?;
        }
        Ok(())
    }

    /// Reads a document as raw text. Missing or unreadable files are `None`.
    async fn read_text(path: &Path) -> Option<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!("Treating unreadable {} as empty: {e}", path.display());
                None
            }
        }
    }

    /// Loads a document, falling back to `T::default()` when it is missing or malformed.
    async fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
        let Some(text) = Self::read_text(path).await else {
            return T::default();
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::debug!("Treating malformed {} as empty: {e}", path.display());
            T::default()
        })
    }

    async fn save_json<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        self.ensure_dirs().await?;
        let json = serde_json::to_string_pretty(data)
            .map_err(|source| BackendError::SerializationFailed { source })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| BackendError::FileIo {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    async fn load_map(path: &Path) -> Map<String, Value> {
        Self::load_or_default(path).await
    }

    async fn lookup(path: &Path, key: &str) -> Option<String> {
        match Self::load_map(path).await.remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }
}

/// File name for `username`, without the extension.
///
/// Always a single path component. `%` is escaped as well, so distinct
/// usernames never share a file.
fn file_stem(username: &str) -> String {
    let mut stem = String::with_capacity(username.len());
    for c in username.chars() {
        match c {
            '%' | '/' | '\\' | '\0' => {
                let _ = write!(stem, "%{:02X}", u32::from(c));
            }
            c => stem.push(c),
        }
    }
    stem
}

#[async_trait]
impl Storage for FileStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn get_user(&self, username: &str) -> Result<Option<String>> {
        Ok(Self::lookup(&self.users_file(), username).await)
    }

    async fn set_user(&self, username: &str, password_hash: &str) -> Result<()> {
        let path = self.users_file();
        let mut users = Self::load_map(&path).await;
        users.insert(username.to_string(), Value::from(password_hash));
        self.save_json(&path, &users).await
    }

    async fn get_all_users(&self) -> Result<HashMap<String, String>> {
        let users = Self::load_map(&self.users_file()).await;
        Ok(users
            .into_iter()
            .filter_map(|(name, hash)| match hash {
                Value::String(hash) => Some((name, hash)),
                _ => None,
            })
            .collect())
    }

    async fn set_session(&self, session_id: &str, username: &str) -> Result<()> {
        let path = self.sessions_file();
        let mut sessions = Self::load_map(&path).await;
        sessions.insert(session_id.to_string(), Value::from(username));
        self.save_json(&path, &sessions).await
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        Ok(Self::lookup(&self.sessions_file(), session_id).await)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let path = self.sessions_file();
        let mut sessions = Self::load_map(&path).await;
        sessions.remove(session_id);
        self.save_json(&path, &sessions).await
    }

    async fn get_list(&self, resource: Resource, username: &str) -> Result<Vec<Value>> {
        let path = self.resource_file(resource, username);
        let text = Self::read_text(&path).await;
        Ok(decode_list(text.as_deref(), &path.display().to_string()))
    }

    async fn save_list(&self, resource: Resource, username: &str, items: &Value) -> Result<()> {
        let Some(items) = items.as_array() else {
            return Ok(());
        };
        let path = self.resource_file(resource, username);
        self.save_json(&path, items).await
    }
}
