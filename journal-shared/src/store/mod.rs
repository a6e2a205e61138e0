/// Persistence layer
///
/// All reads and writes of users, entries and reset tokens go through the
/// [`JournalStore`] trait. Two backends implement it:
///
/// - [`PgStore`]: PostgreSQL via sqlx (deployed mode)
/// - [`FileStore`]: one JSON file per entity type (development mode)
///
/// The backend is chosen once at startup from [`StorageBackend`]; services
/// only ever see `Arc<dyn JournalStore>`.
///
/// # Ownership
///
/// Every entry operation takes the owning user's ID and only matches rows
/// belonging to that user. Foreign or unknown IDs behave as if absent.
///
/// # Example
///
/// ```no_run
/// use journal_shared::store::StorageBackend;
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = StorageBackend::Files { dir: PathBuf::from("./data") }.open().await?;
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

pub mod file;
pub mod postgres;

use crate::models::{DateRange, Entry, EntryChanges, ResetToken, User};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};
use uuid::Uuid;

pub use file::FileStore;
pub use postgres::PgStore;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data violates a model invariant
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence interface shared by both backends
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    /// Verifies the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; `StoreError::Conflict` if the email is taken
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks up a user by normalized email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Replaces a user's password hash; returns false if the user is gone
    async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> StoreResult<bool>;

    async fn insert_entry(&self, entry: Entry) -> StoreResult<Entry>;

    /// Owner's entries inside `range`, newest first
    async fn list_entries(&self, user_id: Uuid, range: &DateRange) -> StoreResult<Vec<Entry>>;

    /// Owner's entries among `ids`, newest first
    async fn find_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Entry>>;

    async fn find_entry(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Entry>> {
        Ok(self.find_entries(user_id, &[id]).await?.into_iter().next())
    }

    /// Applies `changes` to an owned entry; `None` if absent or foreign
    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>>;

    /// Deletes owned entries among `ids`, returning how many were removed
    async fn delete_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64>;

    async fn insert_reset_token(&self, token: ResetToken) -> StoreResult<ResetToken>;

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<ResetToken>>;

    /// Deletes a reset token; true only for the caller that removed it
    async fn consume_reset_token(&self, id: Uuid) -> StoreResult<bool>;
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Flat JSON files under `dir`
    Files { dir: PathBuf },

    /// PostgreSQL database
    Postgres { url: String, max_connections: u32 },
}

impl StorageBackend {
    /// Opens the configured backend, running migrations for PostgreSQL
    pub async fn open(&self) -> StoreResult<Arc<dyn JournalStore>> {
        match self {
            StorageBackend::Files { dir } => {
                let store = FileStore::open(dir).await?;
                Ok(Arc::new(store))
            }
            StorageBackend::Postgres {
                url,
                max_connections,
            } => {
                let pool = crate::db::pool::create_pool(crate::db::pool::DatabaseConfig {
                    url: url.clone(),
                    max_connections: *max_connections,
                    ..Default::default()
                })
                .await?;
                crate::db::migrations::run_migrations(&pool).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Files { .. } => "files",
            StorageBackend::Postgres { .. } => "postgres",
        }
    }
}
