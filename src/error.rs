//! Error types for action-item writes
//!
//! Errors are classified by recoverability:
//! - Retryable: the stored notes changed underneath the edit (re-read, reapply)
//! - NonRetryable: the meeting is gone, or the database failed

use thiserror::Error;

use crate::db::DbError;

/// Errors from reading or writing a meeting's action items
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action '{text}' was not found in meeting {meeting_id}; it may have been modified elsewhere")]
    StaleAction { meeting_id: i64, text: String },

    #[error("Meeting {0} not found")]
    MeetingNotFound(i64),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl ActionError {
    /// Returns true if re-reading and reapplying the edit may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ActionError::StaleAction { .. })
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ActionError::StaleAction { .. } => {
                "Refresh the action list and apply the change again."
            }
            ActionError::MeetingNotFound(_) => "The meeting was deleted. Refresh the list.",
            ActionError::Db(_) => "Check the database path and file permissions.",
        }
    }
}

impl From<rusqlite::Error> for ActionError {
    fn from(err: rusqlite::Error) -> Self {
        ActionError::Db(DbError::Sqlite(err))
    }
}
