use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};

use notekeeper_lib::db::{DbMeeting, MeetingDb, MeetingFilter, NewMeeting, SortOrder};
use notekeeper_lib::notification::GoogleChatSink;
use notekeeper_lib::queries::stats::meeting_stats;
use notekeeper_lib::services::actions::{
    distinct_assignees, filter_action_items, get_all_action_items, update_action_item_status,
    ActionFilter,
};
use notekeeper_lib::state::{load_config, load_config_from};
use notekeeper_lib::types::{ActionStatus, Config, StatusUpdate};
use notekeeper_lib::util::slugify;
use notekeeper_lib::workflow::export::{meeting_ics, meeting_markdown};
use notekeeper_lib::workflow::reminders::send_due_reminders;

#[derive(Parser)]
#[command(name = "notekeeper", version, about = "Meeting notes and action-item tracker")]
struct Cli {
    /// Config file (defaults to ~/.notekeeper/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new meeting
    Add {
        #[arg(long)]
        title: String,
        /// Meeting start, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        date: String,
        #[arg(long)]
        category: Option<String>,
        /// Alta, Media or Baja
        #[arg(long)]
        priority: Option<String>,
        /// Repeat for each attendee
        #[arg(long = "attendee")]
        attendees: Vec<String>,
        #[arg(long)]
        summary: Option<String>,
        /// Repeat for each action line: "[Status] Task - @Assignee - YYYY-MM-DD"
        #[arg(long = "action")]
        actions: Vec<String>,
    },
    /// Change fields of an existing meeting; omitted flags keep their value
    Edit {
        id: i64,
        #[command(flatten)]
        changes: MeetingChanges,
    },
    /// List meetings
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Oldest first
        #[arg(long)]
        asc: bool,
    },
    /// Print one meeting as Markdown
    Show { id: i64 },
    /// Delete a meeting
    Delete { id: i64 },
    /// List action items across all meetings
    Actions {
        #[arg(long)]
        assignee: Option<String>,
        /// Status label, e.g. "Vencido"
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change the status of one action line
    SetStatus {
        meeting_id: i64,
        /// The line exactly as currently stored
        line: String,
        /// New status label, or "Quitar Estado" to clear it
        status: String,
    },
    /// Send Google Chat reminders for due and overdue items
    Remind,
    /// Export one meeting
    Export {
        id: i64,
        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormat,
        /// Output file (defaults to meeting-<id>-<title>.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Meeting counts per month, category and priority
    Stats,
    /// Categories in use, alphabetically
    Categories,
    /// Assignees named in action items, alphabetically
    Assignees,
}

#[derive(Debug, Default, clap::Args)]
struct MeetingChanges {
    #[arg(long)]
    title: Option<String>,
    /// Meeting start, "YYYY-MM-DD HH:MM"
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    priority: Option<String>,
    /// Replaces the attendee list; repeat for each attendee
    #[arg(long = "attendee")]
    attendees: Vec<String>,
    #[arg(long)]
    summary: Option<String>,
    /// Replaces the action items; repeat for each line
    #[arg(long = "action")]
    actions: Vec<String>,
}

impl MeetingChanges {
    /// The stored meeting with every given flag applied on top.
    fn apply_to(self, existing: DbMeeting) -> Result<NewMeeting> {
        let meeting_date = match self.date.as_deref() {
            Some(raw) => normalize_meeting_date(raw)?,
            None => existing.meeting_date,
        };
        Ok(NewMeeting {
            title: self.title.unwrap_or(existing.title),
            meeting_date,
            category: self.category.or(existing.category),
            priority: self.priority.or(existing.priority),
            attendees: joined(&self.attendees).or(existing.attendees),
            summary: self.summary.or(existing.summary),
            action_items: joined(&self.actions).or(existing.action_items),
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Markdown,
    Ics,
}

fn normalize_meeting_date(raw: &str) -> Result<String> {
    let parsed = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    match parsed {
        Some(ts) => Ok(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => bail!("Invalid meeting date '{}', expected YYYY-MM-DD HH:MM", raw),
    }
}

fn joined(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config: Config = match cli.config.as_deref() {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .map_err(anyhow::Error::msg)?;

    let db_path = cli.db.clone().or_else(|| config.database_path.clone());
    let db = MeetingDb::open_configured(db_path.as_deref()).context("Failed to open database")?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Add {
            title,
            date,
            category,
            priority,
            attendees,
            summary,
            actions,
        } => {
            let meeting = NewMeeting {
                title,
                meeting_date: normalize_meeting_date(&date)?,
                category,
                priority,
                attendees: joined(&attendees),
                summary,
                action_items: joined(&actions),
            };
            let id = db.create_meeting(&meeting)?;
            println!("Created meeting {id}");
        }
        Command::Edit { id, changes } => {
            let existing = db
                .get_meeting(id)?
                .with_context(|| format!("Meeting {id} not found"))?;
            let meeting = changes.apply_to(existing)?;
            if !db.update_meeting(id, &meeting)? {
                bail!("Meeting {id} not found");
            }
            println!("Updated meeting {id}");
        }
        Command::List {
            search,
            from,
            to,
            category,
            priority,
            asc,
        } => {
            let filter = MeetingFilter {
                search,
                date_from: from,
                date_to: to,
                category,
                priority,
                order: if asc {
                    SortOrder::Ascending
                } else {
                    SortOrder::Descending
                },
            };
            for meeting in db.list_meetings(&filter)? {
                println!(
                    "{:>5}  {}  {:<10}  {:<6}  {}",
                    meeting.meeting_id,
                    meeting.meeting_date,
                    meeting.category.as_deref().unwrap_or("-"),
                    meeting.priority.as_deref().unwrap_or("-"),
                    meeting.title
                );
            }
        }
        Command::Show { id } => {
            let meeting = db
                .get_meeting(id)?
                .with_context(|| format!("Meeting {id} not found"))?;
            print!("{}", meeting_markdown(&meeting, today));
        }
        Command::Delete { id } => {
            if !db.delete_meeting(id)? {
                bail!("Meeting {id} not found");
            }
            println!("Deleted meeting {id}");
        }
        Command::Actions {
            assignee,
            status,
            search,
            json,
        } => {
            let items = get_all_action_items(&db, today)?;
            let filter = ActionFilter {
                assignee,
                status,
                task_search: search,
            };
            let filtered = filter_action_items(&items, &filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&filtered)?);
            } else {
                for item in &filtered {
                    println!(
                        "[{}] {:<20} {:<12} {:<10} {}",
                        item.meeting_id.unwrap_or_default(),
                        item.status.label(),
                        item.assignee.as_deref().unwrap_or("-"),
                        item.due_date.as_deref().unwrap_or("-"),
                        item.task
                    );
                }
                println!("{} of {} action items", filtered.len(), items.len());
            }
        }
        Command::SetStatus {
            meeting_id,
            line,
            status,
        } => {
            let update = StatusUpdate::from_label(&status);
            if let StatusUpdate::Set(ActionStatus::Custom(label)) = &update {
                log::warn!("'{}' is not a standard status; storing it as written", label);
            }
            if let Err(e) = update_action_item_status(&db, meeting_id, &line, &update) {
                bail!("{} ({})", e, e.recovery_suggestion());
            }
            println!("Status set to '{update}'");
        }
        Command::Remind => {
            let Some(url) = config.webhook_url() else {
                bail!("googleChatWebhookUrl is not configured");
            };
            let sink = GoogleChatSink::new(url)?;
            let items = get_all_action_items(&db, today)?;
            let run = send_due_reminders(&items, today, &config.reminders, &sink).await;
            println!("{} reminders attempted, {} sent", run.attempted, run.sent);
        }
        Command::Export { id, format, out } => {
            let meeting = db
                .get_meeting(id)?
                .with_context(|| format!("Meeting {id} not found"))?;
            let (content, ext) = match format {
                ExportFormat::Markdown => (meeting_markdown(&meeting, today), "md"),
                ExportFormat::Ics => (meeting_ics(&meeting).map_err(anyhow::Error::msg)?, "ics"),
            };
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!("meeting-{}-{}.{}", id, slugify(&meeting.title), ext))
            });
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Command::Stats => {
            let meetings = db.list_meetings(&MeetingFilter {
                order: SortOrder::Ascending,
                ..MeetingFilter::default()
            })?;
            println!("{}", serde_json::to_string_pretty(&meeting_stats(&meetings))?);
        }
        Command::Categories => {
            for category in db.distinct_categories()? {
                println!("{category}");
            }
        }
        Command::Assignees => {
            let items = get_all_action_items(&db, today)?;
            for assignee in distinct_assignees(&items) {
                println!("{assignee}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> DbMeeting {
        DbMeeting {
            meeting_id: 5,
            title: "Weekly sync".to_string(),
            meeting_date: "2026-03-10 09:30:00".to_string(),
            category: Some("Eng".to_string()),
            priority: Some("Alta".to_string()),
            attendees: Some("Ana\nLuis".to_string()),
            summary: Some("<p>Notes</p>".to_string()),
            action_items: Some("Send deck - @Ana".to_string()),
            created_at: "2026-03-09 18:00:00".to_string(),
        }
    }

    #[test]
    fn edit_without_flags_keeps_every_field() {
        let meeting = MeetingChanges::default().apply_to(stored()).unwrap();
        assert_eq!(meeting.title, "Weekly sync");
        assert_eq!(meeting.meeting_date, "2026-03-10 09:30:00");
        assert_eq!(meeting.category.as_deref(), Some("Eng"));
        assert_eq!(meeting.attendees.as_deref(), Some("Ana\nLuis"));
        assert_eq!(meeting.action_items.as_deref(), Some("Send deck - @Ana"));
    }

    #[test]
    fn edit_replaces_given_fields() {
        let changes = MeetingChanges {
            date: Some("2026-03-11 10:00".to_string()),
            priority: Some("Baja".to_string()),
            actions: vec![
                "Send deck - @Ana".to_string(),
                "Book room - 2026-03-20".to_string(),
            ],
            ..MeetingChanges::default()
        };
        let meeting = changes.apply_to(stored()).unwrap();
        assert_eq!(meeting.title, "Weekly sync");
        assert_eq!(meeting.meeting_date, "2026-03-11 10:00:00");
        assert_eq!(meeting.priority.as_deref(), Some("Baja"));
        assert_eq!(
            meeting.action_items.as_deref(),
            Some("Send deck - @Ana\nBook room - 2026-03-20")
        );
        assert_eq!(meeting.summary.as_deref(), Some("<p>Notes</p>"));
    }

    #[test]
    fn edit_rejects_bad_date() {
        let changes = MeetingChanges {
            date: Some("next tuesday".to_string()),
            ..MeetingChanges::default()
        };
        assert!(changes.apply_to(stored()).is_err());
    }

    #[test]
    fn edited_meeting_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let db = MeetingDb::open_at(dir.path().join("notes.db")).unwrap();
        let id = db
            .create_meeting(&NewMeeting {
                title: "Weekly sync".to_string(),
                meeting_date: "2026-03-10 09:30:00".to_string(),
                action_items: Some("Send deck".to_string()),
                ..NewMeeting::default()
            })
            .unwrap();

        let existing = db.get_meeting(id).unwrap().unwrap();
        let changes = MeetingChanges {
            actions: vec!["Send deck".to_string(), "Fix typo - @Luis".to_string()],
            ..MeetingChanges::default()
        };
        assert!(db.update_meeting(id, &changes.apply_to(existing).unwrap()).unwrap());

        let items = get_all_action_items(&db, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(distinct_assignees(&items), vec!["Luis"]);
        assert!(!db.update_meeting(id + 1, &NewMeeting::default()).unwrap());
    }
}
