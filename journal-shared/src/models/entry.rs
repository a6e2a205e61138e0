/// Journal entry model and date filtering
///
/// # Schema
///
/// ```sql
/// CREATE TABLE entries (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A single journal record owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    /// Unique entry ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Entry title
    pub title: String,

    /// Entry body text
    pub content: String,

    /// When the entry was written
    pub created_at: DateTime<Utc>,

    /// When the entry was last edited
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Builds a fresh entry for `user_id`
    pub fn new(user_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Timestamp formatted for display
    pub fn display_time(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Partial update for an entry. Only `Some` fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryChanges {
    /// New title
    pub title: Option<String>,

    /// New body text
    pub content: Option<String>,
}

impl EntryChanges {
    /// Applies the changes to `entry`, bumping `updated_at`
    pub fn apply(self, entry: &mut Entry) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(content) = self.content {
            entry.content = content;
        }
        entry.updated_at = Utc::now();
    }
}

/// Inclusive creation-time bounds for listing entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest creation time (inclusive)
    pub from: Option<DateTime<Utc>>,

    /// Latest creation time (inclusive)
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Unbounded range
    pub fn all() -> Self {
        Self::default()
    }

    /// Range covering whole calendar days (UTC), both ends inclusive
    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let from = start.map(|d| d.and_time(NaiveTime::MIN).and_utc());
        // Last instant of the end day, built without adding a day
        let to = end
            .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
            .map(|dt| dt.and_utc());
        Self { from, to }
    }

    /// Range for a named preset relative to `now`
    pub fn preset(preset: Preset, now: DateTime<Utc>) -> Self {
        let window = match preset {
            Preset::All | Preset::Custom => return Self::all(),
            Preset::Week => Duration::days(7),
            Preset::Month => Duration::days(31),
            Preset::Year => Duration::days(365),
        };
        // "less than N days old": exclude the exact boundary instant
        Self {
            from: Some(now - window + Duration::nanoseconds(1)),
            to: None,
        }
    }

    /// Whether `ts` falls inside the range
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }
}

/// Named date filters offered on the past-entries page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    All,
    Week,
    Month,
    Year,
    Custom,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::All => "all",
            Preset::Week => "week",
            Preset::Month => "month",
            Preset::Year => "year",
            Preset::Custom => "custom",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "" => Ok(Preset::All),
            "week" => Ok(Preset::Week),
            "month" => Ok(Preset::Month),
            "year" => Ok(Preset::Year),
            "custom" => Ok(Preset::Custom),
            other => Err(format!("Unknown preset: {}", other)),
        }
    }
}
