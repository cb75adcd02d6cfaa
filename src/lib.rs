//! Meeting notes with an action-item tracker.
//!
//! Action items live inside each meeting's notes as plain lines
//! (`[Status] Task - @Assignee - YYYY-MM-DD`). [`parser`] decodes them,
//! [`workflow::reconcile`] rewrites a single line when its status changes,
//! and [`services::actions`] runs the read-modify-write against the store.

pub mod db;
pub mod error;
mod migrations;
pub mod notification;
pub mod parser;
pub mod queries;
pub mod services;
pub mod state;
pub mod types;
pub mod util;
pub mod workflow;

pub use error::ActionError;
pub use parser::{decode_action_line, encode_action_item, parse_action_blob};
pub use types::{ActionItem, ActionStatus, StatusEdit, StatusUpdate};
pub use workflow::reconcile::{apply_status_change, StatusChange};
