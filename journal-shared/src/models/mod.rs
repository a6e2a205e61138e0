/// Data models for the journal
///
/// # Models
///
/// - `user`: User accounts and their credentials
/// - `entry`: Journal entries and date-range filters
/// - `reset_token`: Single-use password reset tokens
///
/// Persistence lives in [`crate::store`]; these types are storage-agnostic.
///
/// # Example
///
/// ```
/// use journal_shared::models::entry::{DateRange, Entry};
/// use uuid::Uuid;
///
/// let entry = Entry::new(Uuid::new_v4(), "Day 1".to_string(), "Good day".to_string());
/// assert!(DateRange::all().contains(entry.created_at));
/// ```

pub mod entry;
pub mod reset_token;
pub mod user;

pub use entry::{DateRange, Entry, EntryChanges, Preset};
pub use reset_token::ResetToken;
pub use user::{CreateUser, Credential, User};
