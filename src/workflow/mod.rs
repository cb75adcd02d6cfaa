//! Action-item workflows
//!
//! - reconcile: apply a status change to a meeting's action text
//! - reminders: pick due items and send reminders
//! - export: Markdown and iCalendar renderings of one meeting

pub mod export;
pub mod reconcile;
pub mod reminders;
