/// Account management: registration, login and password resets
///
/// Emails are normalized (trimmed, lowercased) before every lookup, so
/// `Ada@Example.com` and `ada@example.com` are the same account.

use crate::{
    auth::{password, reset_token},
    error::{JournalError, JournalResult},
    models::{
        reset_token::RESET_TOKEN_TTL_HOURS,
        user::{default_display_name, normalize_email},
        CreateUser, Credential, ResetToken, User,
    },
    store::{JournalStore, StoreError},
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::first_validation_message;

#[derive(Debug, Validate)]
struct Registration {
    #[validate(email(message = "Please enter a valid email address"))]
    email: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    name: String,
}

/// A freshly issued reset token; the plaintext exists only here
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration, authentication and password reset
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn JournalStore>,
    reset_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn JournalStore>) -> Self {
        Self {
            store,
            reset_ttl: Duration::hours(RESET_TOKEN_TTL_HOURS),
        }
    }

    /// Overrides the reset token lifetime
    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    /// Creates a password account
    ///
    /// An empty `name` defaults to the capitalised local part of the email.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email, weak password or overlong name
    /// - `DuplicateEmail` if the email is already registered
    pub async fn register(&self, email: &str, password: &str, name: &str) -> JournalResult<User> {
        let registration = Registration {
            email: normalize_email(email),
            name: name.trim().to_string(),
        };
        registration
            .validate()
            .map_err(|e| JournalError::Validation(first_validation_message(&e)))?;
        let Registration { email, name } = registration;

        password::validate_password_strength(password).map_err(JournalError::Validation)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(JournalError::DuplicateEmail);
        }

        let name = if name.is_empty() {
            default_display_name(&email)
        } else {
            name
        };
        let hash = password::hash_password_task(password).await?;

        let user = User::new(CreateUser {
            email,
            name,
            credential: Credential::Password { hash },
        });

        // A concurrent registration can still win the race; the store's
        // uniqueness check is authoritative.
        let user = self.store.insert_user(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => JournalError::DuplicateEmail,
            other => other.into(),
        })?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Checks an email/password pair
    ///
    /// Unknown emails, accounts without a password credential and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> JournalResult<User> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            return Err(JournalError::InvalidCredentials);
        };
        let Some(hash) = user.credential.password_hash() else {
            return Err(JournalError::InvalidCredentials);
        };

        if !password::verify_password_task(password, hash).await? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(JournalError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Issues a reset token for `email`
    ///
    /// Returns `Ok(None)` when no such account exists so callers can answer
    /// identically either way.
    pub async fn request_reset(&self, email: &str) -> JournalResult<Option<IssuedResetToken>> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(None);
        };

        let (token, token_hash) = reset_token::generate_reset_token();
        let stored = self
            .store
            .insert_reset_token(ResetToken::new(user.id, token_hash, self.reset_ttl))
            .await?;

        info!(user_id = %user.id, expires_at = %stored.expires_at, "Issued password reset token");
        Ok(Some(IssuedResetToken {
            user_id: user.id,
            token,
            expires_at: stored.expires_at,
        }))
    }

    /// Checks that a reset token exists and is still valid without consuming it
    pub async fn check_reset_token(&self, token: &str) -> JournalResult<ResetToken> {
        if !reset_token::is_well_formed(token) {
            return Err(JournalError::TokenInvalid);
        }

        let stored = self
            .store
            .find_reset_token(&reset_token::hash_reset_token(token))
            .await?
            .ok_or(JournalError::TokenInvalid)?;

        if stored.is_expired_at(Utc::now()) {
            return Err(JournalError::TokenExpired);
        }
        Ok(stored)
    }

    /// Sets a new password using a reset token
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` if the token is unknown or was already used
    /// - `TokenExpired` if the token is past its expiry
    /// - `Validation` if the new password is too weak (the token stays usable)
    pub async fn reset_password(&self, token: &str, new_password: &str) -> JournalResult<()> {
        let stored = self.check_reset_token(token).await?;

        password::validate_password_strength(new_password).map_err(JournalError::Validation)?;
        let hash = password::hash_password_task(new_password).await?;

        if !self.store.consume_reset_token(stored.id).await? {
            return Err(JournalError::TokenInvalid);
        }
        if !self.store.set_password_hash(stored.user_id, &hash).await? {
            return Err(JournalError::TokenInvalid);
        }

        info!(user_id = %stored.user_id, "Password reset completed");
        Ok(())
    }

    /// Looks up the user behind a session
    pub async fn find_user(&self, id: Uuid) -> JournalResult<Option<User>> {
        Ok(self.store.find_user_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_validation() {
        let ok = Registration {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = Registration {
            email: "not-an-email".to_string(),
            name: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(
            first_validation_message(&errors),
            "Please enter a valid email address"
        );

        let too_long = Registration {
            email: "ada@example.com".to_string(),
            name: "x".repeat(101),
        };
        assert!(too_long.validate().is_err());
    }
}
