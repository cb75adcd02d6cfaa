// Actions service: the read-modify-write paths for action items stored
// inside meeting notes, plus the filters used by the tracker view.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::db::ActionBlobStore;
use crate::error::ActionError;
use crate::parser::parse_action_blob_on;
use crate::types::{ActionItem, StatusEdit, StatusUpdate};
use crate::workflow::reconcile::apply_status_change;

/// Filter value meaning "any assignee" / "any status".
pub const ANY_FILTER: &str = "Todos";

/// Decode the action items of every meeting, newest meeting first, lines in order.
pub fn get_all_action_items<S: ActionBlobStore>(
    store: &S,
    today: NaiveDate,
) -> Result<Vec<ActionItem>, ActionError> {
    let blobs = store.list_blobs()?;
    let items: Vec<ActionItem> = blobs
        .iter()
        .flat_map(|blob| {
            parse_action_blob_on(
                &blob.action_items,
                today,
                Some(blob.meeting_id),
                Some(&blob.title),
            )
        })
        .collect();
    log::debug!("Decoded {} action items from {} meetings", items.len(), blobs.len());
    Ok(items)
}

/// Change the status of one action line.
///
/// Reads the meeting's current text, rewrites the first line matching
/// `original_full_text`, and writes the whole text back, all inside one
/// store transaction. A line that no longer matches is reported as stale
/// and nothing is written.
pub fn update_action_item_status<S: ActionBlobStore>(
    store: &S,
    meeting_id: i64,
    original_full_text: &str,
    update: &StatusUpdate,
) -> Result<(), ActionError> {
    store.atomically(|store| -> Result<(), ActionError> {
        let blob = store
            .get_blob(meeting_id)?
            .ok_or(ActionError::MeetingNotFound(meeting_id))?;

        let change = apply_status_change(&blob, original_full_text, update);
        if !change.found {
            log::warn!(
                "Action '{}' not found in meeting {}; it may have been modified elsewhere",
                original_full_text,
                meeting_id
            );
            return Err(ActionError::StaleAction {
                meeting_id,
                text: original_full_text.to_string(),
            });
        }

        if !store.set_blob(meeting_id, &change.updated_blob)? {
            return Err(ActionError::MeetingNotFound(meeting_id));
        }

        log::info!(
            "Action status set to '{}' in meeting {}",
            update,
            meeting_id
        );
        Ok(())
    })
}

/// Apply status edits in order, stopping at the first failure.
///
/// Returns how many edits were applied. Earlier edits stay committed when a
/// later one fails.
pub fn apply_status_edits<S: ActionBlobStore>(
    store: &S,
    edits: &[StatusEdit],
) -> Result<usize, ActionError> {
    for (applied, edit) in edits.iter().enumerate() {
        if let Err(e) = update_action_item_status(
            store,
            edit.meeting_id,
            &edit.original_full_text,
            &edit.new_status,
        ) {
            log::warn!(
                "Stopped after {} of {} status edits: {}",
                applied,
                edits.len(),
                e
            );
            return Err(e);
        }
    }
    Ok(edits.len())
}

/// Tracker view filters. `None` (or `Todos`) doesn't restrict.
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub assignee: Option<String>,
    /// Status label, matched exactly.
    pub status: Option<String>,
    /// Case-insensitive substring of the task.
    pub task_search: Option<String>,
}

fn effective(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ANY_FILTER)
}

pub fn filter_action_items<'a>(items: &'a [ActionItem], filter: &ActionFilter) -> Vec<&'a ActionItem> {
    let assignee = effective(&filter.assignee);
    let status = effective(&filter.status);
    let needle = effective(&filter.task_search).map(str::to_lowercase);

    items
        .iter()
        .filter(|item| assignee.map_or(true, |a| item.assignee.as_deref() == Some(a)))
        .filter(|item| status.map_or(true, |s| item.status.label() == s))
        .filter(|item| {
            needle
                .as_deref()
                .map_or(true, |n| item.task.to_lowercase().contains(n))
        })
        .collect()
}

/// Distinct assignees, alphabetically.
pub fn distinct_assignees(items: &[ActionItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.assignee.clone())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::db::test_utils::test_db;
    use crate::db::{DbError, MeetingBlob, NewMeeting};
    use crate::types::ActionStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    /// In-memory store that can simulate another writer between requests.
    #[derive(Default)]
    struct MemoryStore {
        blobs: RefCell<BTreeMap<i64, (String, String)>>,
    }

    impl MemoryStore {
        fn with(meetings: &[(i64, &str, &str)]) -> Self {
            let store = Self::default();
            for (id, title, blob) in meetings {
                store
                    .blobs
                    .borrow_mut()
                    .insert(*id, (title.to_string(), blob.to_string()));
            }
            store
        }
    }

    impl ActionBlobStore for MemoryStore {
        fn get_blob(&self, meeting_id: i64) -> Result<Option<String>, DbError> {
            Ok(self.blobs.borrow().get(&meeting_id).map(|(_, b)| b.clone()))
        }

        fn set_blob(&self, meeting_id: i64, blob: &str) -> Result<bool, DbError> {
            match self.blobs.borrow_mut().get_mut(&meeting_id) {
                Some(entry) => {
                    entry.1 = blob.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn list_blobs(&self) -> Result<Vec<MeetingBlob>, DbError> {
            Ok(self
                .blobs
                .borrow()
                .iter()
                .map(|(id, (title, blob))| MeetingBlob {
                    meeting_id: *id,
                    title: title.clone(),
                    action_items: blob.clone(),
                })
                .collect())
        }
    }

    #[test]
    fn aggregates_items_with_back_references() {
        let store = MemoryStore::with(&[
            (1, "Kickoff", "Send deck - @Ana\n\nBook room - 2000-01-01"),
            (2, "Retro", "[Completado] Write notes"),
        ]);
        let items = get_all_action_items(&store, today()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].meeting_title.as_deref(), Some("Kickoff"));
        assert!(items[1].is_overdue);
        assert_eq!(items[2].meeting_id, Some(2));
        assert_eq!(items[2].status, ActionStatus::Completed);
    }

    #[test]
    fn update_writes_full_blob() {
        let store = MemoryStore::with(&[(1, "Kickoff", "Send deck - @Ana\n\nBook room")]);
        update_action_item_status(&store, 1, "Book room", &StatusUpdate::from_label("Completado"))
            .unwrap();
        assert_eq!(
            store.get_blob(1).unwrap().as_deref(),
            Some("Send deck - @Ana\n\n[Completado] Book room")
        );
    }

    #[test]
    fn stale_line_is_a_conflict_and_writes_nothing() {
        let store = MemoryStore::with(&[(1, "Kickoff", "Send deck - @Ana")]);
        let err = update_action_item_status(&store, 1, "Send deck", &StatusUpdate::Remove)
            .unwrap_err();
        assert!(matches!(err, ActionError::StaleAction { meeting_id: 1, .. }));
        assert!(err.is_retryable());
        assert_eq!(store.get_blob(1).unwrap().as_deref(), Some("Send deck - @Ana"));
    }

    #[test]
    fn missing_meeting_is_reported() {
        let store = MemoryStore::default();
        let err = update_action_item_status(&store, 42, "x", &StatusUpdate::Remove).unwrap_err();
        assert!(matches!(err, ActionError::MeetingNotFound(42)));
    }

    #[test]
    fn edit_keyed_on_old_text_fails_after_concurrent_change() {
        let store = MemoryStore::with(&[(1, "Kickoff", "Book room")]);
        let items = get_all_action_items(&store, today()).unwrap();
        let key = items[0].original_full_text.clone();

        // Someone else edits the line after the list was read.
        store.set_blob(1, "Book room B").unwrap();

        let err = update_action_item_status(&store, 1, &key, &StatusUpdate::from_label("Completado"))
            .unwrap_err();
        assert!(err.is_retryable());

        // Retry after re-reading.
        let items = get_all_action_items(&store, today()).unwrap();
        update_action_item_status(
            &store,
            1,
            &items[0].original_full_text,
            &StatusUpdate::from_label("Completado"),
        )
        .unwrap();
        assert_eq!(store.get_blob(1).unwrap().as_deref(), Some("[Completado] Book room B"));
    }

    #[test]
    fn edits_stop_at_first_failure() {
        let store = MemoryStore::with(&[(1, "Kickoff", "A\nB"), (2, "Retro", "C")]);
        let edits = vec![
            StatusEdit {
                meeting_id: 1,
                original_full_text: "A".to_string(),
                new_status: StatusUpdate::from_label("En Progreso"),
            },
            StatusEdit {
                meeting_id: 2,
                original_full_text: "missing".to_string(),
                new_status: StatusUpdate::from_label("Completado"),
            },
            StatusEdit {
                meeting_id: 1,
                original_full_text: "B".to_string(),
                new_status: StatusUpdate::from_label("Completado"),
            },
        ];
        assert!(apply_status_edits(&store, &edits).is_err());
        assert_eq!(store.get_blob(1).unwrap().as_deref(), Some("[En Progreso] A\nB"));

        assert!(apply_status_edits(&store, &edits[..1]).unwrap_err().is_retryable());
        assert_eq!(apply_status_edits(&store, &edits[2..]).unwrap(), 1);
        assert_eq!(
            store.get_blob(1).unwrap().as_deref(),
            Some("[En Progreso] A\n[Completado] B")
        );
    }

    #[test]
    fn sqlite_store_round_trip() {
        let db = test_db();
        let id = db
            .create_meeting(&NewMeeting {
                title: "Planning".to_string(),
                meeting_date: "2026-03-01 10:00:00".to_string(),
                action_items: Some("Draft plan - @Ana - 2999-01-01\n\nDraft plan - @Ana - 2999-01-01".to_string()),
                ..NewMeeting::default()
            })
            .unwrap();

        let items = get_all_action_items(&db, today()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].status, ActionStatus::Pending);

        update_action_item_status(&db, id, &items[0].original_full_text, &StatusUpdate::from_label("Completado"))
            .unwrap();
        assert_eq!(
            db.get_blob(id).unwrap().as_deref(),
            Some("[Completado] Draft plan - @Ana - 2999-01-01\n\nDraft plan - @Ana - 2999-01-01")
        );

        let err = update_action_item_status(&db, id, "gone", &StatusUpdate::Remove).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn filters_and_assignees() {
        let store = MemoryStore::with(&[(
            1,
            "Kickoff",
            "Send deck - @Ana\nBook room - @Luis - 2000-01-01\n[Completado] Send invoice - @Ana",
        )]);
        let items = get_all_action_items(&store, today()).unwrap();

        assert_eq!(distinct_assignees(&items), vec!["Ana", "Luis"]);

        let ana = filter_action_items(
            &items,
            &ActionFilter {
                assignee: Some("Ana".to_string()),
                ..ActionFilter::default()
            },
        );
        assert_eq!(ana.len(), 2);

        let overdue = filter_action_items(
            &items,
            &ActionFilter {
                status: Some("Vencido".to_string()),
                assignee: Some(ANY_FILTER.to_string()),
                ..ActionFilter::default()
            },
        );
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].task, "Book room");

        let send = filter_action_items(
            &items,
            &ActionFilter {
                task_search: Some("SEND".to_string()),
                ..ActionFilter::default()
            },
        );
        assert_eq!(send.len(), 2);
    }
}
