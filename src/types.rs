use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder webhook value shipped in the sample secrets file.
pub const WEBHOOK_PLACEHOLDER: &str = "TU_URL_DE_WEBHOOK_AQUÍ";

/// Configuration stored in ~/.notekeeper/config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Explicit SQLite path. Defaults to `~/.notekeeper/notekeeper.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_chat_webhook_url: Option<String>,
    #[serde(default)]
    pub reminders: ReminderSettings,
}

impl Config {
    /// Webhook URL, unless missing, blank, or still the sample placeholder.
    pub fn webhook_url(&self) -> Option<&str> {
        self.google_chat_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != WEBHOOK_PLACEHOLDER)
    }
}

/// When overdue tasks keep getting reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    /// Remind every day while a task is at most this many days overdue.
    #[serde(default = "default_overdue_window_days")]
    pub overdue_window_days: i64,
    /// After the window, remind on every multiple of this many days overdue.
    #[serde(default = "default_repeat_every_days")]
    pub repeat_every_days: i64,
}

fn default_overdue_window_days() -> i64 {
    7
}

fn default_repeat_every_days() -> i64 {
    3
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            overdue_window_days: default_overdue_window_days(),
            repeat_every_days: default_repeat_every_days(),
        }
    }
}

// =============================================================================
// Action items
// =============================================================================

/// Status of an action item.
///
/// Known statuses carry the labels stored in the notes. Bracket prefixes
/// outside the known set are kept verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Overdue,
    OpenNoDate,
    Custom(String),
}

impl ActionStatus {
    /// Statuses offered by the status picker, in display order.
    pub const KNOWN: [ActionStatus; 6] = [
        ActionStatus::Pending,
        ActionStatus::InProgress,
        ActionStatus::Completed,
        ActionStatus::Cancelled,
        ActionStatus::Overdue,
        ActionStatus::OpenNoDate,
    ];

    /// Map a stored label to a status. Only exact label matches become
    /// known variants.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Pendiente" => Self::Pending,
            "En Progreso" => Self::InProgress,
            "Completado" => Self::Completed,
            "Cancelado" => Self::Cancelled,
            "Vencido" => Self::Overdue,
            "Abierto (sin fecha)" => Self::OpenNoDate,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pendiente",
            Self::InProgress => "En Progreso",
            Self::Completed => "Completado",
            Self::Cancelled => "Cancelado",
            Self::Overdue => "Vencido",
            Self::OpenNoDate => "Abierto (sin fecha)",
            Self::Custom(label) => label.as_str(),
        }
    }

    /// Completed and cancelled items never count as overdue.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ActionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Requested status for one action line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Set(ActionStatus),
    /// Drop the `[Status]` prefix entirely.
    Remove,
}

impl StatusUpdate {
    /// Picker label meaning "remove the prefix".
    pub const REMOVE_LABEL: &'static str = "Quitar Estado";

    /// Parse a picker label. Empty input and the remove label both clear the prefix.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == Self::REMOVE_LABEL {
            Self::Remove
        } else {
            Self::Set(ActionStatus::from_label(label))
        }
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(status) => f.write_str(status.label()),
            Self::Remove => f.write_str(Self::REMOVE_LABEL),
        }
    }
}

/// One action item decoded from a line of a meeting's notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// ISO `YYYY-MM-DD`, exactly as written in the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub is_overdue: bool,
    pub status: ActionStatus,
    /// True when `status` came from a `[Status]` prefix rather than being derived.
    pub has_status_prefix: bool,
    /// The exact source line. Key used to find the line again on write.
    pub original_full_text: String,
    /// The line without its `[Status]` prefix.
    pub reserializable_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_title: Option<String>,
}

/// A requested status change for one line of one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEdit {
    pub meeting_id: i64,
    pub original_full_text: String,
    pub new_status: StatusUpdate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in ActionStatus::KNOWN {
            assert_eq!(ActionStatus::from_label(status.label()), status);
        }
        assert_eq!(
            ActionStatus::from_label("Bloqueado"),
            ActionStatus::Custom("Bloqueado".to_string())
        );
        // Labels are matched exactly.
        assert_eq!(
            ActionStatus::from_label("completado"),
            ActionStatus::Custom("completado".to_string())
        );
    }

    #[test]
    fn status_update_remove_labels() {
        assert_eq!(StatusUpdate::from_label(""), StatusUpdate::Remove);
        assert_eq!(StatusUpdate::from_label("Quitar Estado"), StatusUpdate::Remove);
        assert_eq!(
            StatusUpdate::from_label("En Progreso"),
            StatusUpdate::Set(ActionStatus::InProgress)
        );
    }

    #[test]
    fn webhook_placeholder_is_not_configured() {
        let mut config = Config {
            google_chat_webhook_url: Some(WEBHOOK_PLACEHOLDER.to_string()),
            ..Config::default()
        };
        assert_eq!(config.webhook_url(), None);

        config.google_chat_webhook_url = Some("https://chat.example/hook".to_string());
        assert_eq!(config.webhook_url(), Some("https://chat.example/hook"));
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.reminders, ReminderSettings::default());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&ActionStatus::OpenNoDate).unwrap();
        assert_eq!(json, "\"Abierto (sin fecha)\"");
    }
}
