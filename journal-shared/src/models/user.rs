/// User model
///
/// A user signs in with a password, an external identity, or both. The
/// [`Credential`] union makes a user with no authentication method
/// unrepresentable.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     password_hash TEXT,
///     external_subject TEXT UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL,
///     CHECK (password_hash IS NOT NULL OR external_subject IS NOT NULL)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a user proves who they are
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// Argon2id password hash
    Password { hash: String },

    /// Identity asserted by an external provider
    External { subject: String },

    /// Both a password and an external identity
    PasswordAndExternal { hash: String, subject: String },
}

impl Credential {
    /// Rebuilds a credential from nullable storage columns
    ///
    /// Returns `None` when both parts are absent.
    pub fn from_parts(hash: Option<String>, subject: Option<String>) -> Option<Self> {
        match (hash, subject) {
            (Some(hash), Some(subject)) => Some(Credential::PasswordAndExternal { hash, subject }),
            (Some(hash), None) => Some(Credential::Password { hash }),
            (None, Some(subject)) => Some(Credential::External { subject }),
            (None, None) => None,
        }
    }

    /// Password hash, if the user has one
    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Credential::Password { hash } | Credential::PasswordAndExternal { hash, .. } => {
                Some(hash)
            }
            Credential::External { .. } => None,
        }
    }

    /// External identity subject, if the user has one
    pub fn external_subject(&self) -> Option<&str> {
        match self {
            Credential::External { subject } | Credential::PasswordAndExternal { subject, .. } => {
                Some(subject)
            }
            Credential::Password { .. } => None,
        }
    }

    /// Returns a copy with the password hash replaced (or added)
    pub fn with_password(&self, hash: String) -> Self {
        match self.external_subject() {
            Some(subject) => Credential::PasswordAndExternal {
                hash,
                subject: subject.to_string(),
            },
            None => Credential::Password { hash },
        }
    }
}

/// A journal user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, trimmed and lowercased
    pub email: String,

    /// Display name
    pub name: String,

    /// Authentication method(s)
    pub credential: Credential,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Normalized email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Initial credential
    pub credential: Credential,
}

impl User {
    /// Builds a fresh user record from creation input
    pub fn new(data: CreateUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            credential: data.credential,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalizes an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derives a display name from an email's local part ("jane.doe@x" -> "Jane.doe")
pub fn default_display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Journaler".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_from_parts() {
        assert_eq!(
            Credential::from_parts(Some("h".into()), None),
            Some(Credential::Password { hash: "h".into() })
        );
        assert_eq!(
            Credential::from_parts(None, Some("g-1".into())),
            Some(Credential::External { subject: "g-1".into() })
        );
        assert!(matches!(
            Credential::from_parts(Some("h".into()), Some("g-1".into())),
            Some(Credential::PasswordAndExternal { .. })
        ));
        assert_eq!(Credential::from_parts(None, None), None);
    }

    #[test]
    fn test_external_only_has_no_password() {
        let credential = Credential::External { subject: "g-1".into() };
        assert!(credential.password_hash().is_none());
        assert_eq!(credential.external_subject(), Some("g-1"));
    }

    #[test]
    fn test_with_password_keeps_external_identity() {
        let credential = Credential::External { subject: "g-1".into() };
        let updated = credential.with_password("new".into());
        assert_eq!(updated.password_hash(), Some("new"));
        assert_eq!(updated.external_subject(), Some("g-1"));

        let replaced = Credential::Password { hash: "old".into() }.with_password("new".into());
        assert_eq!(replaced, Credential::Password { hash: "new".into() });
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn test_default_display_name() {
        assert_eq!(default_display_name("jane@example.com"), "Jane");
        assert_eq!(default_display_name("@example.com"), "Journaler");
    }
}
