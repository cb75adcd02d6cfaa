//! Meeting statistics: counts per month, category and priority.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::{DbMeeting, PRIORITIES};

/// Category label for meetings without one.
pub const NO_CATEGORY: &str = "Sin Categoría";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStats {
    pub total: usize,
    /// `YYYY-MM`, oldest first.
    pub per_month: Vec<CountBucket>,
    /// Alphabetical, with meetings lacking a category under `Sin Categoría`.
    pub per_category: Vec<CountBucket>,
    /// Alta, Media, Baja first, then any other stored values alphabetically.
    pub per_priority: Vec<CountBucket>,
}

fn buckets(counts: BTreeMap<String, usize>) -> Vec<CountBucket> {
    counts
        .into_iter()
        .map(|(label, count)| CountBucket { label, count })
        .collect()
}

pub fn meeting_stats(meetings: &[DbMeeting]) -> MeetingStats {
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    let mut priorities: BTreeMap<String, usize> = BTreeMap::new();

    for meeting in meetings {
        // Stored as "YYYY-MM-DD HH:MM:SS"; the first 7 chars are the month.
        if let Some(month) = meeting.meeting_date.get(..7) {
            *months.entry(month.to_string()).or_default() += 1;
        }

        let category = meeting
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_CATEGORY);
        *categories.entry(category.to_string()).or_default() += 1;

        if let Some(priority) = meeting.priority.as_deref().filter(|p| !p.is_empty()) {
            *priorities.entry(priority.to_string()).or_default() += 1;
        }
    }

    let mut per_priority = Vec::new();
    for known in PRIORITIES {
        if let Some(count) = priorities.remove(known) {
            per_priority.push(CountBucket {
                label: known.to_string(),
                count,
            });
        }
    }
    per_priority.extend(buckets(priorities));

    MeetingStats {
        total: meetings.len(),
        per_month: buckets(months),
        per_category: buckets(categories),
        per_priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(date: &str, category: Option<&str>, priority: Option<&str>) -> DbMeeting {
        DbMeeting {
            meeting_id: 1,
            title: "m".to_string(),
            meeting_date: date.to_string(),
            category: category.map(String::from),
            priority: priority.map(String::from),
            attendees: None,
            summary: None,
            action_items: None,
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn counts_by_month_category_priority() {
        let meetings = vec![
            meeting("2026-02-03 10:00:00", Some("Sales"), Some("Baja")),
            meeting("2026-01-15 10:00:00", None, Some("Alta")),
            meeting("2026-02-20 10:00:00", Some("Sales"), Some("Urgente")),
            meeting("2026-02-21 10:00:00", Some(""), Some("Alta")),
        ];
        let stats = meeting_stats(&meetings);

        assert_eq!(stats.total, 4);
        let months: Vec<(&str, usize)> = stats
            .per_month
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(months, vec![("2026-01", 1), ("2026-02", 3)]);

        let categories: Vec<(&str, usize)> = stats
            .per_category
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(categories, vec![("Sales", 2), (NO_CATEGORY, 2)]);

        let priorities: Vec<&str> = stats.per_priority.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(priorities, vec!["Alta", "Baja", "Urgente"]);
        assert_eq!(stats.per_priority[0].count, 2);
    }

    #[test]
    fn empty_input_gives_empty_stats() {
        assert_eq!(meeting_stats(&[]), MeetingStats::default());
    }
}
