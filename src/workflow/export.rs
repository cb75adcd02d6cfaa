//! Single-meeting exports: Markdown minutes and an iCalendar event.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::db::DbMeeting;
use crate::parser::decode_action_line_on;
use crate::types::ActionStatus;
use crate::util::{non_empty_lines, strip_html_tags, truncate_chars};

/// Characters of the stripped summary copied into the calendar description.
const ICS_SUMMARY_CHARS: usize = 200;

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

fn format_timestamp(raw: &str, fmt: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format(fmt).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Render a meeting as Markdown minutes. Overdue is judged against `today`.
pub fn meeting_markdown(meeting: &DbMeeting, today: NaiveDate) -> String {
    let mut md = format!("# {}\n\n", meeting.title);
    md.push_str(&format!("**ID:** `{}`\n", meeting.meeting_id));
    md.push_str(&format!(
        "**Fecha:** {}\n",
        format_timestamp(&meeting.meeting_date, "%Y-%m-%d %H:%M")
    ));
    if let Some(category) = present(&meeting.category) {
        md.push_str(&format!("**Categoría/Proyecto:** {}\n", category));
    }
    if let Some(priority) = present(&meeting.priority) {
        md.push_str(&format!("**Prioridad:** {}\n", priority));
    }
    md.push_str(&format!(
        "**Fecha de Creación:** {}\n\n",
        format_timestamp(&meeting.created_at, "%Y-%m-%d %H:%M:%S")
    ));

    md.push_str("## 👥 Asistentes\n");
    match present(&meeting.attendees) {
        Some(attendees) => {
            for attendee in non_empty_lines(attendees) {
                md.push_str(&format!("- {}\n", attendee));
            }
        }
        None => md.push_str("N/A\n"),
    }
    md.push('\n');

    md.push_str("## 📝 Resumen / Minuta\n");
    match present(&meeting.summary) {
        Some(summary) => md.push_str(&format!("{}\n\n", strip_html_tags(summary))),
        None => md.push_str("N/A\n\n"),
    }

    md.push_str("## 📌 Puntos de Acción\n");
    match present(&meeting.action_items) {
        Some(blob) => {
            for line in non_empty_lines(blob) {
                let action = decode_action_line_on(line, today, None, None);
                md.push_str(&format!("- **Tarea ({}):** {}\n", action.status, action.task));
                if let Some(assignee) = action.assignee.as_deref() {
                    md.push_str(&format!("  - **Responsable:** {}\n", assignee));
                }
                if let Some(due) = action.due_date.as_deref() {
                    let flag = if action.is_overdue && action.status != ActionStatus::Completed {
                        " (VENCIDO!)"
                    } else {
                        ""
                    };
                    md.push_str(&format!("  - **Para:** {}{}\n", due, flag));
                }
                md.push('\n');
            }
        }
        None => md.push_str("N/A\n"),
    }
    md
}

/// Escape a value for an iCalendar TEXT property.
fn ics_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

/// Longest content line, in octets, before folding.
const ICS_LINE_OCTETS: usize = 75;

/// Fold a content line at 75 octets. Continuation lines start with a space,
/// which counts toward their length. Splits only on char boundaries.
fn fold_ics_line(line: &str) -> String {
    if line.len() <= ICS_LINE_OCTETS {
        return line.to_string();
    }
    let mut folded = String::with_capacity(line.len() + line.len() / ICS_LINE_OCTETS * 3);
    let mut width = 0;
    for ch in line.chars() {
        if width + ch.len_utf8() > ICS_LINE_OCTETS {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(ch);
        width += ch.len_utf8();
    }
    folded
}

/// Render a meeting as a one-hour iCalendar event.
pub fn meeting_ics(meeting: &DbMeeting) -> Result<String, String> {
    build_ics(meeting, &Uuid::new_v4().to_string(), Utc::now())
}

fn build_ics(meeting: &DbMeeting, uid: &str, stamp: DateTime<Utc>) -> Result<String, String> {
    let start = parse_timestamp(&meeting.meeting_date)
        .ok_or_else(|| format!("Invalid meeting date: {}", meeting.meeting_date))?;
    let end = start + Duration::hours(1);

    let mut description = format!(
        "Categoría: {}\nPrioridad: {}\n",
        present(&meeting.category).unwrap_or("N/A"),
        present(&meeting.priority).unwrap_or("N/A"),
    );
    if let Some(summary) = present(&meeting.summary) {
        let clean = strip_html_tags(summary);
        description.push_str(&format!(
            "\nResumen:\n{}...",
            truncate_chars(&clean, ICS_SUMMARY_CHARS)
        ));
    }

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//notekeeper//meeting export//ES".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", uid),
        format!("DTSTAMP:{}", stamp.format("%Y%m%dT%H%M%SZ")),
        format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")),
        format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")),
        format!("SUMMARY:{}", ics_escape(&meeting.title)),
        format!("DESCRIPTION:{}", ics_escape(&description)),
    ];
    if let Some(attendees) = present(&meeting.attendees) {
        for attendee in non_empty_lines(attendees) {
            lines.push(format!("ATTENDEE;CN={}:{}", ics_escape(attendee), ics_escape(attendee)));
        }
    }
    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    let folded: Vec<String> = lines.iter().map(|line| fold_ics_line(line)).collect();
    let mut ics = folded.join("\r\n");
    ics.push_str("\r\n");
    Ok(ics)
}
