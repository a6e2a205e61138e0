/// Business operations on top of [`crate::store::JournalStore`]
///
/// - `auth`: registration, login, password reset
/// - `entries`: per-user entry CRUD and selection

pub mod auth;
pub mod entries;

pub use auth::{AuthService, IssuedResetToken};
pub use entries::EntryService;

/// First human-readable message out of a validator error set
pub(crate) fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}
