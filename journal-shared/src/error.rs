/// Domain errors shared by the services
///
/// Every variant is recoverable; the web layer turns each into a
/// user-facing message or page.

use crate::{auth::password::PasswordError, store::StoreError, summarize::SummarizeError};

/// Result type for service operations
pub type JournalResult<T> = Result<T, JournalError>;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Registration with an email that is already taken
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Unknown email, missing password credential or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Reset token unknown or already used
    #[error("Reset link is invalid or has already been used")]
    TokenInvalid,

    /// Reset token past its expiry
    #[error("Reset link has expired")]
    TokenExpired,

    /// Entry absent or owned by someone else
    #[error("Entry not found")]
    NotFound,

    /// Summarization endpoint failed or answered nonsense
    #[error("Summarization failed: {0}")]
    Upstream(String),

    /// Input rejected before reaching storage
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<SummarizeError> for JournalError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::NoEntries => {
                JournalError::Validation("Select at least one entry to summarize".to_string())
            }
            other => JournalError::Upstream(other.to_string()),
        }
    }
}
