use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Config;

/// Default location: ~/.notekeeper/config.json
pub fn default_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".notekeeper").join("config.json"))
}

/// Load configuration from ~/.notekeeper/config.json.
///
/// A missing file is not an error; every setting has a default.
pub fn load_config() -> Result<Config, String> {
    load_config_from(&default_config_path()?)
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert!(config.google_chat_webhook_url.is_none());
        assert_eq!(config.reminders.overdue_window_days, 7);
    }

    #[test]
    fn reads_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "databasePath": "/tmp/notes.db",
                "googleChatWebhookUrl": "https://chat.example/hook",
                "reminders": { "overdueWindowDays": 3 }
            }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(config.webhook_url(), Some("https://chat.example/hook"));
        assert_eq!(config.reminders.overdue_window_days, 3);
        assert_eq!(config.reminders.repeat_every_days, 3);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }
}
