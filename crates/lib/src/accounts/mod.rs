//! Accounts: registration, login and session verification.
//!
//! Built only on the [`Storage`] contract, so it behaves the same on every backend.
//! Password hashes and session ids are produced here; storage keeps them as
//! opaque strings.

pub mod crypto;
mod errors;

use std::sync::Arc;

use uuid::Uuid;

pub use errors::AccountError;

use crate::Result;
use crate::backend::Storage;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

/// Account operations over a shared storage backend.
#[derive(Clone)]
pub struct Accounts {
    storage: Arc<dyn Storage>,
}

impl Accounts {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The backend accounts are stored in.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Registers `username` with `password`.
    ///
    /// The username is trimmed before validation and storage.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials.into());
        }
        validate_username(username)?;

        if self.storage.user_exists(username).await? {
            return Err(AccountError::UsernameTaken {
                username: username.to_string(),
            }
            .into());
        }

        let password_hash = crypto::hash_password(password)?;
        self.storage.set_user(username, &password_hash).await?;
        tracing::info!("Registered user {}", username);
        Ok(())
    }

    /// Checks credentials and opens a session.
    ///
    /// Returns the new session id, or `None` for an unknown user or wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let Some(password_hash) = self.storage.get_user(username).await? else {
            return Ok(None);
        };
        if !crypto::verify_password(password, &password_hash) {
            return Ok(None);
        }

        let session_id = Uuid::new_v4().to_string();
        self.storage.set_session(&session_id, username).await?;
        Ok(Some(session_id))
    }

    /// Ends the session, if any.
    pub async fn logout(&self, session_id: Option<&str>) -> Result<()> {
        match session_id {
            Some(id) if !id.is_empty() => self.storage.delete_session(id).await,
            _ => Ok(()),
        }
    }

    /// Username behind `session_id`, or `None` when not logged in.
    pub async fn verify_session(&self, session_id: Option<&str>) -> Result<Option<String>> {
        match session_id {
            Some(id) if !id.is_empty() => self.storage.get_session(id).await,
            _ => Ok(None),
        }
    }
}

/// Usernames name files in the file backend, so they are restricted to a
/// portable character set and may not start with a dot.
pub fn validate_username(username: &str) -> std::result::Result<(), AccountError> {
    let invalid = |reason: &str| AccountError::InvalidUsername {
        reason: reason.to_string(),
    };

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(invalid("too long"));
    }
    if username.starts_with('.') {
        return Err(invalid("cannot start with '.'"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("only letters, digits, '-', '_' and '.' are allowed"));
    }
    Ok(())
}
