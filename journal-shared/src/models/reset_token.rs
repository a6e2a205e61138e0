/// Password reset token model
///
/// Only the SHA-256 hash of the secret token is persisted. Tokens are
/// single-use: consuming one deletes it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reset_tokens (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash TEXT NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lifetime of a reset token
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResetToken {
    pub id: Uuid,

    /// User whose password may be reset
    pub user_id: Uuid,

    /// SHA-256 hex digest of the secret token
    pub token_hash: String,

    pub created_at: DateTime<Utc>,

    /// Token is valid strictly before this instant
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Builds a token record expiring `ttl` from now
    pub fn new(user_id: Uuid, token_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Checks whether the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
