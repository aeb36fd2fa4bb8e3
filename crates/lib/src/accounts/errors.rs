//! Error types for the accounts layer
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Username and password required")]
    MissingCredentials,

    #[error("Invalid username: {reason}")]
    InvalidUsername { reason: String },

    #[error("Username already exists: {username}")]
    UsernameTaken { username: String },

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },
}

impl AccountError {
    /// Check if this error indicates the account already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AccountError::UsernameTaken { .. })
    }

    /// Check if this error was caused by the submitted credentials.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AccountError::MissingCredentials
                | AccountError::InvalidUsername { .. }
                | AccountError::UsernameTaken { .. }
        )
    }
}

impl From<AccountError> for crate::Error {
    fn from(err: AccountError) -> Self {
        crate::Error::Account(err)
    }
}
