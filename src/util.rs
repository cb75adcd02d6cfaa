use std::sync::OnceLock;

use regex::Regex;

fn html_tag_regex() -> &'static Regex {
    static HTML_TAG_RE: OnceLock<Regex> = OnceLock::new();
    HTML_TAG_RE.get_or_init(|| Regex::new(r"<[^<]+?>").expect("html tag regex should compile"))
}

/// Drop HTML tags from rich-text minutes, keeping the text between them.
pub fn strip_html_tags(html: &str) -> String {
    html_tag_regex().replace_all(html, "").into_owned()
}

/// First `max` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trimmed, non-empty lines of a multi-line field (attendees, action items).
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Convert a display name to a file-name-safe kebab-case slug.
///
/// Example: "Weekly Sync" → "weekly-sync"
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(
            strip_html_tags("<p>Budget <strong>approved</strong></p>"),
            "Budget approved"
        );
        assert_eq!(strip_html_tags("no tags"), "no tags");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("añoñ", 2), "añ");
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[test]
    fn test_non_empty_lines() {
        let lines: Vec<&str> = non_empty_lines("Ana\n\n  Luis \n").collect();
        assert_eq!(lines, vec!["Ana", "Luis"]);
    }

    #[test]
    fn test_slugify_special_chars() {
        assert_eq!(slugify("Weekly Sync — Team Alpha"), "weekly-sync-team-alpha");
        assert_eq!(slugify("Q2 Planning"), "q2-planning");
    }
}
