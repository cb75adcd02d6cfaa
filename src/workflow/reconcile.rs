//! Status reconciliation for action lines.
//!
//! A status edit names its line by the line's exact text at read time. The
//! edit is applied to a freshly read copy of the meeting's action text: the
//! first line whose trimmed text matches gets its `[Status]` prefix replaced,
//! every other line (blank ones included) is copied through untouched.

use serde::Serialize;

use crate::parser::decode_action_line;
use crate::types::StatusUpdate;

/// Outcome of applying one status change to a meeting's action text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Complete replacement text. Equal to the input when `found` is false.
    pub updated_blob: String,
    pub found: bool,
}

/// Rebuild a line under a new status from its prefix-free text.
pub fn rebuild_line(reserializable_text: &str, update: &StatusUpdate) -> String {
    match update {
        StatusUpdate::Remove => reserializable_text.to_string(),
        StatusUpdate::Set(status) => format!("[{}] {}", status.label(), reserializable_text),
    }
}

/// Apply `update` to the first line of `blob` matching `target_original_text`.
///
/// Only the first match changes: identical lines can't be told apart by
/// their text. When nothing matches the caller's view of the line is stale
/// and `updated_blob` is returned unchanged.
pub fn apply_status_change(
    blob: &str,
    target_original_text: &str,
    update: &StatusUpdate,
) -> StatusChange {
    let target = target_original_text.trim();
    let mut found = false;

    let lines: Vec<String> = blob
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if found || trimmed.is_empty() || trimmed != target {
                return line.to_string();
            }
            found = true;
            let item = decode_action_line(trimmed, None, None);
            let mut rebuilt = rebuild_line(&item.reserializable_text, update);
            // Keep CRLF blobs consistent.
            if line.ends_with('\r') {
                rebuilt.push('\r');
            }
            rebuilt
        })
        .collect();

    if !found {
        return StatusChange {
            updated_blob: blob.to_string(),
            found: false,
        };
    }

    StatusChange {
        updated_blob: lines.join("\n"),
        found: true,
    }
}
