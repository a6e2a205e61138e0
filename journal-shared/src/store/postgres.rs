/// PostgreSQL backend
///
/// Uses runtime-checked sqlx queries against the schema in
/// `journal-shared/migrations`. Ownership is enforced in every `WHERE`
/// clause; uniqueness and the credential invariant are enforced by the
/// database and surfaced as `StoreError::Conflict` / `StoreError::Corrupt`.

use super::{JournalStore, StoreError, StoreResult};
use crate::models::{Credential, DateRange, Entry, EntryChanges, ResetToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, external_subject, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// Row shape of the `users` table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: Option<String>,
    external_subject: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let credential = Credential::from_parts(row.password_hash, row.external_subject)
            .ok_or_else(|| StoreError::Corrupt(format!("user {} has no credential", row.id)))?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            credential,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Maps unique and foreign-key violations to `Conflict`
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(constraint) = db_err.constraint() {
            return StoreError::Conflict(constraint.to_string());
        }
    }
    StoreError::Database(err)
}

/// sqlx/PostgreSQL implementation of [`JournalStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl JournalStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, external_subject, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.credential.password_hash())
        .bind(user.credential.external_subject())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_entry(&self, entry: Entry) -> StoreResult<Entry> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            r#"
            INSERT INTO entries (id, user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(entry)
    }

    async fn list_entries(&self, user_id: Uuid, range: &DateRange) -> StoreResult<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM entries
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Entry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let entries = sqlx::query_as::<_, Entry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM entries
            WHERE user_id = $1 AND id = ANY($2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            r#"
            UPDATE entries
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn delete_entries(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM entries WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_reset_token(&self, token: ResetToken) -> StoreResult<ResetToken> {
        let token = sqlx::query_as::<_, ResetToken>(
            r#"
            INSERT INTO reset_tokens (id, user_id, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.created_at)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(token)
    }

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<ResetToken>> {
        let token = sqlx::query_as::<_, ResetToken>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at
            FROM reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn consume_reset_token(&self, id: Uuid) -> StoreResult<bool> {
        // Single DELETE: only one concurrent caller sees a row affected
        let result = sqlx::query("DELETE FROM reset_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
