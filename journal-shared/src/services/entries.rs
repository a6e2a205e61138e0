/// Journal entry operations scoped to the owning user
///
/// Every call takes the acting user's ID. Entries belonging to anyone else
/// behave exactly like entries that do not exist.

use crate::{
    error::{JournalError, JournalResult},
    models::{DateRange, Entry, EntryChanges},
    store::JournalStore,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Number of entries shown on the home page
pub const RECENT_ENTRIES: usize = 10;

fn clean_title(title: &str) -> JournalResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(JournalError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(JournalError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

/// Create, list, edit and delete journal entries
#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn JournalStore>,
}

impl EntryService {
    pub fn new(store: Arc<dyn JournalStore>) -> Self {
        Self { store }
    }

    /// Writes a new entry; title and body are trimmed
    pub async fn create(&self, user_id: Uuid, title: &str, content: &str) -> JournalResult<Entry> {
        let title = clean_title(title)?;
        let entry = self
            .store
            .insert_entry(Entry::new(user_id, title, content.trim().to_string()))
            .await?;

        info!(user_id = %user_id, entry_id = %entry.id, "Created entry");
        Ok(entry)
    }

    /// Owner's entries inside `range`, newest first
    pub async fn list(&self, user_id: Uuid, range: &DateRange) -> JournalResult<Vec<Entry>> {
        let entries = self.store.list_entries(user_id, range).await?;
        debug!(user_id = %user_id, count = entries.len(), "Listed entries");
        Ok(entries)
    }

    /// The `limit` newest entries
    pub async fn recent(&self, user_id: Uuid, limit: usize) -> JournalResult<Vec<Entry>> {
        let mut entries = self.store.list_entries(user_id, &DateRange::all()).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn get(&self, user_id: Uuid, entry_id: Uuid) -> JournalResult<Entry> {
        self.store
            .find_entry(user_id, entry_id)
            .await?
            .ok_or(JournalError::NotFound)
    }

    /// Applies a partial update
    ///
    /// # Errors
    ///
    /// `NotFound` if the entry is absent or foreign, `Validation` for an
    /// empty title.
    pub async fn update(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
    ) -> JournalResult<Entry> {
        let changes = EntryChanges {
            title: changes.title.as_deref().map(clean_title).transpose()?,
            content: changes.content.map(|c| c.trim().to_string()),
        };

        let entry = self
            .store
            .update_entry(user_id, entry_id, changes)
            .await?
            .ok_or(JournalError::NotFound)?;

        info!(user_id = %user_id, entry_id = %entry_id, "Updated entry");
        Ok(entry)
    }

    /// Deletes one entry; returns 0 if it was absent or foreign
    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> JournalResult<u64> {
        self.delete_bulk(user_id, &[entry_id]).await
    }

    /// Deletes the owner's entries among `ids`; others are skipped silently
    pub async fn delete_bulk(&self, user_id: Uuid, ids: &[Uuid]) -> JournalResult<u64> {
        let removed = self.store.delete_entries(user_id, ids).await?;
        info!(user_id = %user_id, requested = ids.len(), removed, "Deleted entries");
        Ok(removed)
    }

    /// Owner's entries among `ids`, newest first
    pub async fn select(&self, user_id: Uuid, ids: &[Uuid]) -> JournalResult<Vec<Entry>> {
        Ok(self.store.find_entries(user_id, ids).await?)
    }
}
