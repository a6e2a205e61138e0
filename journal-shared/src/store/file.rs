/// Flat-file backend
///
/// Keeps users, entries and reset tokens in three pretty-printed JSON arrays:
///
/// ```text
/// <dir>/users.json
/// <dir>/entries.json
/// <dir>/reset_tokens.json
/// ```
///
/// All three collections are loaded at open and held behind one async mutex.
/// A mutation builds the new collection, rewrites the affected file in full
/// (temp file + rename) and only then replaces the in-memory copy. A failed
/// write leaves both memory and disk unchanged. Intended for development and
/// single-instance use.

use super::{JournalStore, StoreError, StoreResult};
use crate::models::{DateRange, Entry, EntryChanges, ResetToken, User};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

const USERS_FILE: &str = "users.json";
const ENTRIES_FILE: &str = "entries.json";
const RESET_TOKENS_FILE: &str = "reset_tokens.json";

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    entries: Vec<Entry>,
    reset_tokens: Vec<ResetToken>,
}

/// JSON-file implementation of [`JournalStore`]
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    state: Mutex<Collections>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`
    ///
    /// Missing or empty files are treated as empty collections.
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let state = Collections {
            users: load(&dir.join(USERS_FILE)).await?,
            entries: load(&dir.join(ENTRIES_FILE)).await?,
            reset_tokens: load(&dir.join(RESET_TOKENS_FILE)).await?,
        };

        info!(
            dir = %dir.display(),
            users = state.users.len(),
            entries = state.entries.len(),
            "Opened file store"
        );

        Ok(Self {
            dir,
            state: Mutex::new(state),
        })
    }

    async fn save<T: Serialize>(&self, file: &str, records: &[T]) -> StoreResult<()> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{}.tmp", file));

        let body = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(file, records = records.len(), "Rewrote store file");
        Ok(())
    }
}

async fn load<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl JournalStore for FileStore {
    fn backend(&self) -> &'static str {
        "files"
    }

    async fn ping(&self) -> StoreResult<()> {
        tokio::fs::metadata(&self.dir).await?;
        Ok(())
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut state = self.state.lock().await;

        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users.email".to_string()));
        }
        if let Some(subject) = user.credential.external_subject() {
            if state
                .users
                .iter()
                .any(|u| u.credential.external_subject() == Some(subject))
            {
                return Err(StoreError::Conflict("users.external_subject".to_string()));
            }
        }

        let mut users = state.users.clone();
        users.push(user.clone());
        self.save(USERS_FILE, &users).await?;

        state.users = users;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;

        let mut users = state.users.clone();
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        user.credential = user.credential.with_password(hash.to_string());
        user.updated_at = Utc::now();
        self.save(USERS_FILE, &users).await?;

        state.users = users;
        Ok(true)
    }

    async fn insert_entry(&self, entry: Entry) -> StoreResult<Entry> {
        let mut state = self.state.lock().await;

        if !state.users.iter().any(|u| u.id == entry.user_id) {
            return Err(StoreError::Conflict("entries.user_id".to_string()));
        }

        let mut entries = state.entries.clone();
        entries.push(entry.clone());
        self.save(ENTRIES_FILE, &entries).await?;

        state.entries = entries;
        Ok(entry)
    }

    async fn list_entries(&self, user_id: Uuid, range: &DateRange) -> StoreResult<Vec<Entry>> {
        let state = self.state.lock().await;

        let mut entries: Vec<Entry> = state
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && range.contains(e.created_at))
            .cloned()
            .collect();
        newest_first(&mut entries);

        Ok(entries)
    }

    async fn find_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Entry>> {
        let state = self.state.lock().await;

        let mut entries: Vec<Entry> = state
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && ids.contains(&e.id))
            .cloned()
            .collect();
        newest_first(&mut entries);

        Ok(entries)
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>> {
        let mut state = self.state.lock().await;

        let mut entries = state.entries.clone();
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
        else {
            return Ok(None);
        };
        changes.apply(entry);
        let updated = entry.clone();
        self.save(ENTRIES_FILE, &entries).await?;

        state.entries = entries;
        Ok(Some(updated))
    }

    async fn delete_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64> {
        let mut state = self.state.lock().await;

        let entries: Vec<Entry> = state
            .entries
            .iter()
            .filter(|e| !(e.user_id == user_id && ids.contains(&e.id)))
            .cloned()
            .collect();
        let removed = (state.entries.len() - entries.len()) as u64;

        if removed > 0 {
            self.save(ENTRIES_FILE, &entries).await?;
            state.entries = entries;
        }
        Ok(removed)
    }

    async fn insert_reset_token(&self, token: ResetToken) -> StoreResult<ResetToken> {
        let mut state = self.state.lock().await;

        if state
            .reset_tokens
            .iter()
            .any(|t| t.token_hash == token.token_hash)
        {
            return Err(StoreError::Conflict("reset_tokens.token_hash".to_string()));
        }

        let mut tokens = state.reset_tokens.clone();
        tokens.push(token.clone());
        self.save(RESET_TOKENS_FILE, &tokens).await?;

        state.reset_tokens = tokens;
        Ok(token)
    }

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<ResetToken>> {
        let state = self.state.lock().await;
        Ok(state
            .reset_tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn consume_reset_token(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;

        let tokens: Vec<ResetToken> = state
            .reset_tokens
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        if tokens.len() == state.reset_tokens.len() {
            return Ok(false);
        }

        self.save(RESET_TOKENS_FILE, &tokens).await?;
        state.reset_tokens = tokens;
        Ok(true)
    }
}
