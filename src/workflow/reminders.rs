//! Due-date reminders for open action items.
//!
//! Items due today or tomorrow always get a reminder. Overdue items get one
//! every day for the first `overdue_window_days`, then only on multiples of
//! `repeat_every_days` so long-forgotten tasks don't spam the channel.

use chrono::NaiveDate;
use serde::Serialize;

use crate::notification::{NotificationSink, ReminderPayload};
use crate::parser::parse_due_date;
use crate::types::{ActionItem, ReminderSettings};

/// Status labels (lowercased) that never get reminders.
const CLOSED_STATUSES: [&str; 6] = [
    "completado",
    "cancelado",
    "cancelada",
    "[completado]",
    "[cancelado]",
    "[cancelada]",
];

fn is_closed(item: &ActionItem) -> bool {
    item.status.is_terminal() || CLOSED_STATUSES.contains(&item.status.label().to_lowercase().as_str())
}

/// Whether an item due on `due` should be reminded about on `today`.
pub fn reminder_due(due: NaiveDate, today: NaiveDate, settings: &ReminderSettings) -> bool {
    if due == today || Some(due) == today.succ_opt() {
        return true;
    }
    if due > today {
        return false;
    }
    let days_overdue = (today - due).num_days();
    days_overdue <= settings.overdue_window_days
        || (settings.repeat_every_days > 0 && days_overdue % settings.repeat_every_days == 0)
}

/// Pick the items that should get a reminder today, in input order.
pub fn select_due_reminders<'a>(
    items: &'a [ActionItem],
    today: NaiveDate,
    settings: &ReminderSettings,
) -> Vec<&'a ActionItem> {
    items
        .iter()
        .filter(|item| !is_closed(item))
        .filter(|item| {
            let Some(raw) = item.due_date.as_deref() else {
                return false;
            };
            match parse_due_date(raw) {
                Some(due) => reminder_due(due, today, settings),
                None => {
                    log::warn!("Skipping reminder for '{}': bad due date '{}'", item.task, raw);
                    false
                }
            }
        })
        .collect()
}

/// Counts from one reminder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRun {
    pub checked: usize,
    pub attempted: usize,
    pub sent: usize,
}

/// Send a reminder for every due item. A failed send is logged and the run
/// continues with the next item.
pub async fn send_due_reminders(
    items: &[ActionItem],
    today: NaiveDate,
    settings: &ReminderSettings,
    sink: &dyn NotificationSink,
) -> ReminderRun {
    log::info!("Checking {} action items for reminders", items.len());
    let due = select_due_reminders(items, today, settings);

    let mut run = ReminderRun {
        checked: items.len(),
        ..ReminderRun::default()
    };
    for item in due {
        run.attempted += 1;
        let payload = ReminderPayload::from_item(item);
        match sink.send(&payload, today).await {
            Ok(()) => run.sent += 1,
            Err(e) => log::warn!("Reminder for '{}' failed: {}", item.task, e),
        }
    }

    log::info!(
        "Reminder check finished: {} attempted, {} sent",
        run.attempted,
        run.sent
    );
    run
}
