//! Task reminder delivery.
//!
//! A reminder is built straight from a decoded action item and handed to a
//! [`NotificationSink`]. The production sink posts a card to a Google Chat
//! incoming webhook.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::ActionItem;

const APP_ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/10828/10828783.png";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Google Chat webhook URL is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Webhook returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl NotificationError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            NotificationError::NotConfigured => false,
            NotificationError::Network(_) => true,
            NotificationError::Http { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Everything a reminder shows, copied verbatim from the action item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub task: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub status: String,
    pub is_overdue: bool,
    pub meeting_id: Option<i64>,
    pub meeting_title: Option<String>,
}

impl ReminderPayload {
    pub fn from_item(item: &ActionItem) -> Self {
        Self {
            task: item.task.clone(),
            assignee: item.assignee.clone(),
            due_date: item.due_date.clone(),
            status: item.status.label().to_string(),
            is_overdue: item.is_overdue,
            meeting_id: item.meeting_id,
            meeting_title: item.meeting_title.clone(),
        }
    }

    /// Which headline the reminder gets, relative to `today`.
    pub fn kind(&self, today: NaiveDate) -> ReminderKind {
        if self.is_overdue || self.status.eq_ignore_ascii_case("vencido") {
            return ReminderKind::Overdue;
        }
        let due = self
            .due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        match due {
            Some(d) if d == today => ReminderKind::DueToday,
            Some(d) if Some(d) == today.succ_opt() => ReminderKind::DueTomorrow,
            _ => ReminderKind::Upcoming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Overdue,
    DueToday,
    DueTomorrow,
    Upcoming,
}

impl ReminderKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReminderKind::Overdue => "⚠️ Tarea Vencida ⚠️",
            ReminderKind::DueToday => "📢 Tarea para Hoy 📢",
            ReminderKind::DueTomorrow => "💡 Tarea para Mañana 💡",
            ReminderKind::Upcoming => "🔔 Recordatorio de Tarea 🔔",
        }
    }

    pub fn status_emoji(&self) -> &'static str {
        match self {
            ReminderKind::Overdue => "🔴",
            _ => "➡️",
        }
    }
}

fn decorated_text(label: &str, text: String) -> Value {
    json!({ "decoratedText": { "topLabel": label, "text": text } })
}

/// Google Chat `cardsV2` message for one reminder.
pub fn google_chat_card(payload: &ReminderPayload, today: NaiveDate) -> Value {
    let kind = payload.kind(today);
    let meeting = payload.meeting_title.as_deref().unwrap_or("N/A");
    let assignee = payload
        .assignee
        .clone()
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "<i>Nadie</i>".to_string());

    json!({
        "cardsV2": [{
            "cardId": "reminderCard",
            "card": {
                "header": {
                    "title": kind.title(),
                    "subtitle": format!("Reunión: {meeting}"),
                    "imageUrl": APP_ICON_URL,
                    "imageType": "CIRCLE"
                },
                "sections": [{
                    "widgets": [
                        {
                            "decoratedText": {
                                "topLabel": "TAREA",
                                "text": format!("<b>{}</b>", payload.task),
                                "wrapText": true
                            }
                        },
                        decorated_text(
                            "FECHA LÍMITE",
                            payload.due_date.clone().unwrap_or_else(|| "N/A".to_string()),
                        ),
                        decorated_text("ASIGNADO A", assignee),
                        decorated_text(
                            "ESTADO ACTUAL",
                            format!("{} {}", kind.status_emoji(), payload.status),
                        )
                    ]
                }]
            }
        }]
    })
}

/// Destination for task reminders.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, payload: &ReminderPayload, today: NaiveDate) -> Result<(), NotificationError>;
}

/// Posts reminders to a Google Chat incoming webhook.
pub struct GoogleChatSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl GoogleChatSink {
    pub fn new(webhook_url: &str) -> Result<Self, NotificationError> {
        let webhook_url = webhook_url.trim();
        if webhook_url.is_empty() || webhook_url == crate::types::WEBHOOK_PLACEHOLDER {
            return Err(NotificationError::NotConfigured);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSink for GoogleChatSink {
    async fn send(&self, payload: &ReminderPayload, today: NaiveDate) -> Result<(), NotificationError> {
        let body = google_chat_card(payload, today);
        let resp = self
            .client
            .post(&self.webhook_url)
            .header("Content-Type", "application/json; charset=UTF-8")
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(NotificationError::Http { status, body });
        }

        log::info!("Reminder sent to Google Chat for task '{}'", payload.task);
        Ok(())
    }
}
