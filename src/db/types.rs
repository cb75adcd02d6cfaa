use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// Filter value meaning "no restriction" for category and priority.
pub const ALL_FILTER: &str = "Todas";

/// Priority stored when none is given.
pub const DEFAULT_PRIORITY: &str = "Media";

/// Priority choices, highest first.
pub const PRIORITIES: [&str; 3] = ["Alta", "Media", "Baja"];

/// A row from the `meetings` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbMeeting {
    pub meeting_id: i64,
    pub title: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub meeting_date: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    /// One attendee per line.
    pub attendees: Option<String>,
    /// Rich-text (HTML) minutes.
    pub summary: Option<String>,
    /// One action item per line.
    pub action_items: Option<String>,
    pub created_at: String,
}

/// Fields supplied when creating or updating a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub title: String,
    pub meeting_date: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub attendees: Option<String>,
    pub summary: Option<String>,
    pub action_items: Option<String>,
}

/// The action-item text of one meeting, with enough context to label the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingBlob {
    pub meeting_id: i64,
    pub title: String,
    pub action_items: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Meeting list filters. Empty fields don't restrict.
#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    /// Substring matched against title, attendees, summary, action items and category.
    pub search: Option<String>,
    /// Inclusive, from the start of the day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive, through the end of the day.
    pub date_to: Option<NaiveDate>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub order: SortOrder,
}

impl MeetingFilter {
    pub(crate) fn effective(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != ALL_FILTER)
    }
}
