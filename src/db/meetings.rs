use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::*;

const MEETING_COLUMNS: &str = "meeting_id, title, meeting_date, category, priority, attendees,
     summary, action_items, created_at";

impl MeetingDb {
    // =========================================================================
    // Meetings
    // =========================================================================

    fn map_meeting_row(row: &Row) -> rusqlite::Result<DbMeeting> {
        Ok(DbMeeting {
            meeting_id: row.get(0)?,
            title: row.get(1)?,
            meeting_date: row.get(2)?,
            category: row.get(3)?,
            priority: row.get(4)?,
            attendees: row.get(5)?,
            summary: row.get(6)?,
            action_items: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Insert a meeting and return its id.
    pub fn create_meeting(&self, meeting: &NewMeeting) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO meetings (title, meeting_date, category, priority, attendees, summary, action_items)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                meeting.title,
                meeting.meeting_date,
                meeting.category,
                meeting.priority.as_deref().unwrap_or(DEFAULT_PRIORITY),
                meeting.attendees,
                meeting.summary,
                meeting.action_items,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::info!("Created meeting {} '{}'", id, meeting.title);
        Ok(id)
    }

    pub fn get_meeting(&self, meeting_id: i64) -> Result<Option<DbMeeting>, DbError> {
        let sql = format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE meeting_id = ?1");
        let meeting = self
            .conn
            .query_row(&sql, params![meeting_id], Self::map_meeting_row)
            .optional()?;
        Ok(meeting)
    }

    /// Overwrite every editable field. Returns false when the meeting doesn't exist.
    pub fn update_meeting(&self, meeting_id: i64, meeting: &NewMeeting) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET title = ?1, meeting_date = ?2, category = ?3, priority = ?4,
                 attendees = ?5, summary = ?6, action_items = ?7
             WHERE meeting_id = ?8",
            params![
                meeting.title,
                meeting.meeting_date,
                meeting.category,
                meeting.priority.as_deref().unwrap_or(DEFAULT_PRIORITY),
                meeting.attendees,
                meeting.summary,
                meeting.action_items,
                meeting_id,
            ],
        )?;
        if changed > 0 {
            log::info!("Updated meeting {}", meeting_id);
        }
        Ok(changed > 0)
    }

    pub fn delete_meeting(&self, meeting_id: i64) -> Result<bool, DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM meetings WHERE meeting_id = ?1", params![meeting_id])?;
        if changed > 0 {
            log::info!("Deleted meeting {}", meeting_id);
        }
        Ok(changed > 0)
    }

    /// List meetings matching `filter`, ordered by meeting date.
    pub fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<DbMeeting>, DbError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            values.push(format!("%{term}%"));
            let n = values.len();
            clauses.push(format!(
                "(title LIKE ?{n} OR attendees LIKE ?{n} OR summary LIKE ?{n}
                  OR action_items LIKE ?{n} OR category LIKE ?{n})"
            ));
        }
        if let Some(from) = filter.date_from {
            values.push(format!("{} 00:00:00", from.format("%Y-%m-%d")));
            clauses.push(format!("meeting_date >= ?{}", values.len()));
        }
        if let Some(to) = filter.date_to {
            values.push(format!("{} 23:59:59", to.format("%Y-%m-%d")));
            clauses.push(format!("meeting_date <= ?{}", values.len()));
        }
        if let Some(category) = MeetingFilter::effective(&filter.category) {
            values.push(category.to_string());
            clauses.push(format!("category = ?{}", values.len()));
        }
        if let Some(priority) = MeetingFilter::effective(&filter.priority) {
            values.push(priority.to_string());
            clauses.push(format!("priority = ?{}", values.len()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let direction = match filter.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {MEETING_COLUMNS} FROM meetings {where_sql}
             ORDER BY meeting_date {direction}, meeting_id {direction}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), Self::map_meeting_row)?;

        let mut meetings = Vec::new();
        for row in rows {
            meetings.push(row?);
        }
        Ok(meetings)
    }

    /// Distinct non-empty categories, alphabetically.
    pub fn distinct_categories(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM meetings
             WHERE category IS NOT NULL AND category != ''
             ORDER BY category ASC",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }
}

impl ActionBlobStore for MeetingDb {
    fn get_blob(&self, meeting_id: i64) -> Result<Option<String>, DbError> {
        let blob = self
            .conn
            .query_row(
                "SELECT action_items FROM meetings WHERE meeting_id = ?1",
                params![meeting_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(blob.map(Option::unwrap_or_default))
    }

    fn set_blob(&self, meeting_id: i64, blob: &str) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE meetings SET action_items = ?1 WHERE meeting_id = ?2",
            params![blob, meeting_id],
        )?;
        Ok(changed > 0)
    }

    fn list_blobs(&self) -> Result<Vec<MeetingBlob>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT meeting_id, title, action_items FROM meetings
             WHERE action_items IS NOT NULL AND action_items != ''
             ORDER BY meeting_date DESC, meeting_id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MeetingBlob {
                meeting_id: row.get(0)?,
                title: row.get(1)?,
                action_items: row.get(2)?,
            })
        })?;

        let mut blobs = Vec::new();
        for row in rows {
            blobs.push(row?);
        }
        Ok(blobs)
    }

    fn atomically<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        self.with_transaction(f)
    }
}
