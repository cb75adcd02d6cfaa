//! Action-item line format.
//!
//! Each meeting stores its action items as newline-separated lines:
//!
//! ```text
//! [Status] Task text - @Assignee - YYYY-MM-DD
//! ```
//!
//! Everything after the task is optional, and the date may come before the
//! assignee. Decoding never fails: text that doesn't fit a slot stays in the
//! task or the assignee.

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::types::{ActionItem, ActionStatus};

/// Separator between the task, assignee and date segments.
pub const SEGMENT_SEPARATOR: &str = " - ";

/// Maximum number of segments a line is split into. Anything past the
/// second separator stays in the last segment.
const MAX_SEGMENTS: usize = 3;

fn status_prefix_regex() -> &'static Regex {
    static STATUS_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    STATUS_PREFIX_RE.get_or_init(|| {
        Regex::new(r"^\[(.*?)\]\s*(.*)").expect("status prefix regex should compile")
    })
}

/// Split a leading `[Status]` prefix off a trimmed line.
///
/// Returns the trimmed bracket content (if any) and the working text.
fn split_status_prefix(line: &str) -> (Option<&str>, &str) {
    match status_prefix_regex().captures(line) {
        Some(caps) => {
            let status = caps.get(1).map_or("", |m| m.as_str()).trim();
            let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
            (Some(status), rest)
        }
        None => (None, line),
    }
}

fn due_date_shape_regex() -> &'static Regex {
    static DUE_DATE_RE: OnceLock<Regex> = OnceLock::new();
    DUE_DATE_RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("due date regex should compile")
    })
}

/// Parse a `YYYY-MM-DD` due date. The year must be exactly four digits.
pub fn parse_due_date(token: &str) -> Option<NaiveDate> {
    if !due_date_shape_regex().is_match(token) {
        return None;
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

fn strip_at(token: &str) -> &str {
    token.strip_prefix('@').unwrap_or(token)
}

/// Assignee and due date recovered from the segments after the task.
#[derive(Debug, Default)]
struct Trailer {
    assignee: Option<String>,
    due_date: Option<(String, NaiveDate)>,
}

/// Resolve segments 1 and 2 into an assignee and a due date.
///
/// Segment 1 is an `@assignee`, a date, or free assignee text. Segment 2
/// fills whichever slot segment 1 left empty; when segment 1 was an assignee
/// and segment 2 is not a date, it is appended to the assignee.
fn parse_trailer(first: Option<&str>, second: Option<&str>) -> Trailer {
    let mut trailer = Trailer::default();
    let Some(first) = first.filter(|s| !s.is_empty()) else {
        return trailer;
    };

    if first.starts_with('@') {
        trailer.assignee = Some(strip_at(first).to_string());
    } else if let Some(date) = parse_due_date(first) {
        trailer.due_date = Some((first.to_string(), date));
    } else {
        trailer.assignee = Some(first.to_string());
    }

    // A bare "@" leaves nothing to extend; segment 2 is dropped.
    if trailer.assignee.as_deref() == Some("") {
        trailer.assignee = None;
        return trailer;
    }

    let Some(second) = second.filter(|s| !s.is_empty()) else {
        return trailer;
    };

    if let Some(assignee) = trailer.assignee.as_mut() {
        match parse_due_date(second) {
            Some(date) => trailer.due_date = Some((second.to_string(), date)),
            None => {
                assignee.push(' ');
                assignee.push_str(second);
            }
        }
    } else {
        trailer.assignee = Some(strip_at(second).to_string()).filter(|s| !s.is_empty());
    }

    trailer
}

/// Decode one action line against today's local date.
pub fn decode_action_line(
    line: &str,
    meeting_id: Option<i64>,
    meeting_title: Option<&str>,
) -> ActionItem {
    decode_action_line_on(line, Local::now().date_naive(), meeting_id, meeting_title)
}

/// Decode one action line, judging overdue dates against `today`.
pub fn decode_action_line_on(
    line: &str,
    today: NaiveDate,
    meeting_id: Option<i64>,
    meeting_title: Option<&str>,
) -> ActionItem {
    let original_full_text = line.trim();
    let (prefix, working_text) = split_status_prefix(original_full_text);
    // "[]" strips like any prefix but carries no status.
    let prefix = prefix.filter(|p| !p.is_empty());

    let segments: Vec<&str> = working_text
        .splitn(MAX_SEGMENTS, SEGMENT_SEPARATOR)
        .map(str::trim)
        .collect();
    let task = segments.first().copied().unwrap_or("").to_string();
    let trailer = parse_trailer(segments.get(1).copied(), segments.get(2).copied());

    let date_is_past = trailer
        .due_date
        .as_ref()
        .is_some_and(|(_, date)| *date < today);

    let (status, is_overdue) = match prefix {
        Some(label) => {
            let status = ActionStatus::from_label(label);
            let is_overdue = date_is_past && !status.is_terminal();
            (status, is_overdue)
        }
        None if date_is_past => (ActionStatus::Overdue, true),
        None if trailer.due_date.is_some() => (ActionStatus::Pending, false),
        None => (ActionStatus::OpenNoDate, false),
    };

    ActionItem {
        task,
        assignee: trailer.assignee,
        due_date: trailer.due_date.map(|(raw, _)| raw),
        is_overdue,
        status,
        has_status_prefix: prefix.is_some(),
        original_full_text: original_full_text.to_string(),
        reserializable_text: working_text.to_string(),
        meeting_id,
        meeting_title: meeting_title.map(String::from),
    }
}

/// Build the canonical line for an item.
///
/// The `[Status]` prefix is written only when the status came from one;
/// derived statuses (overdue, pending, open) are recomputed on decode.
pub fn encode_action_item(item: &ActionItem) -> String {
    let mut line = String::new();
    if item.has_status_prefix {
        line.push('[');
        line.push_str(item.status.label());
        line.push_str("] ");
    }
    line.push_str(&item.task);
    if let Some(assignee) = item.assignee.as_deref() {
        line.push_str(SEGMENT_SEPARATOR);
        line.push('@');
        line.push_str(assignee);
    }
    if let Some(due) = item.due_date.as_deref() {
        line.push_str(SEGMENT_SEPARATOR);
        line.push_str(due);
    }
    line
}

/// Decode every non-blank line of a meeting's action-item text, in order.
pub fn parse_action_blob(
    blob: &str,
    meeting_id: Option<i64>,
    meeting_title: Option<&str>,
) -> Vec<ActionItem> {
    parse_action_blob_on(blob, Local::now().date_naive(), meeting_id, meeting_title)
}

pub fn parse_action_blob_on(
    blob: &str,
    today: NaiveDate,
    meeting_id: Option<i64>,
    meeting_title: Option<&str>,
) -> Vec<ActionItem> {
    blob.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| decode_action_line_on(line, today, meeting_id, meeting_title))
        .collect()
}
