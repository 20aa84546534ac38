//! Checklist action item extraction.
//!
//! # Invariants
//! - A checkbox marker alone is enough to emit an item (text may be empty).
//! - Output is ordered by line and identical for identical input.
//! - Recognized `@handle`, `Due: YYYY-MM-DD` and `[priority]` tokens are
//!   removed from `text`; a `Due:` token whose date is not a real calendar
//!   date stays in `text` and leaves `due_date` empty.

use crate::extract::dates::{parse_calendar_date, DATE_GRAMMAR};
use crate::model::note::ActionItem;
use once_cell::sync::Lazy;
use regex::Regex;

static CHECKBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*]\s+\[([ xX])\](?:\s+(.*))?\s*$").expect("valid checkbox regex")
});
static ASSIGNEE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(,;])@(\w[\w-]*)").expect("valid assignee regex"));
static DUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bdue:\s*({DATE_GRAMMAR})\b")).expect("valid due regex")
});
static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z][\w-]*)\]").expect("valid priority regex"));

const SEPARATOR_TOKENS: &[&str] = &["-", "--", "–", "—", "|", ",", ";"];

/// Extracts action items in line order.
///
/// Line numbers are 1-based and relative to `body`.
pub fn extract_action_items(body: &str) -> Vec<ActionItem> {
    body.lines()
        .enumerate()
        .filter_map(|(index, line)| parse_action_line(line, index + 1))
        .collect()
}

/// Parses one line; `None` when it is not a checklist line.
pub fn parse_action_line(line: &str, line_number: usize) -> Option<ActionItem> {
    let caps = CHECKBOX_RE.captures(line)?;
    let completed = caps
        .get(1)
        .is_some_and(|marker| marker.as_str().eq_ignore_ascii_case("x"));
    let mut rest = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let assignee = take_assignee(&mut rest);
    let due_date = take_due_date(&mut rest);
    let priority = take_priority(&mut rest);

    Some(ActionItem {
        text: clean_description(&rest),
        completed,
        assignee,
        due_date,
        priority,
        line: line_number,
    })
}

fn take_assignee(rest: &mut String) -> Option<String> {
    let (range, handle) = {
        let caps = ASSIGNEE_RE.captures(rest)?;
        let lead = caps.get(1)?;
        let handle = caps.get(2)?;
        (lead.end()..handle.end(), handle.as_str().to_string())
    };
    rest.replace_range(range, " ");
    Some(handle)
}

fn take_due_date(rest: &mut String) -> Option<chrono::NaiveDate> {
    let (range, date) = {
        let caps = DUE_RE
            .captures_iter(rest)
            .find(|caps| caps.get(1).and_then(|m| parse_calendar_date(m.as_str())).is_some())?;
        let whole = caps.get(0)?;
        let date = caps.get(1).and_then(|m| parse_calendar_date(m.as_str()))?;
        (whole.range(), date)
    };
    rest.replace_range(range, " ");
    Some(date)
}

fn take_priority(rest: &mut String) -> Option<String> {
    // `[label](url)` is a markdown link, not a priority.
    let (range, priority) = PRIORITY_RE.captures_iter(rest).find_map(|caps| {
        let whole = caps.get(0)?;
        if rest[whole.end()..].starts_with('(') {
            return None;
        }
        Some((whole.range(), caps.get(1)?.as_str().to_ascii_lowercase()))
    })?;
    rest.replace_range(range, " ");
    Some(priority)
}

/// Collapses whitespace, drops separators left dangling at either end and
/// merges runs of adjacent separators.
fn clean_description(raw: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in raw.split_whitespace() {
        let is_separator = SEPARATOR_TOKENS.contains(&token);
        if is_separator {
            let previous_is_separator = kept
                .last()
                .map_or(true, |last| SEPARATOR_TOKENS.contains(last));
            if previous_is_separator {
                continue;
            }
        }
        kept.push(token);
    }
    while kept
        .last()
        .is_some_and(|last| SEPARATOR_TOKENS.contains(last))
    {
        kept.pop();
    }
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::{extract_action_items, parse_action_line};
    use chrono::NaiveDate;

    #[test]
    fn parses_all_annotations() {
        let item = parse_action_line("- [ ] Fix bug - @alice - Due: 2025-01-01 [high]", 1).unwrap();
        assert_eq!(item.text, "Fix bug");
        assert!(!item.completed);
        assert_eq!(item.assignee.as_deref(), Some("alice"));
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(item.priority.as_deref(), Some("high"));
    }

    #[test]
    fn checked_item_without_annotations() {
        let item = parse_action_line("- [x] Done task", 3).unwrap();
        assert!(item.completed);
        assert_eq!(item.text, "Done task");
        assert_eq!(item.assignee, None);
        assert_eq!(item.due_date, None);
        assert_eq!(item.priority, None);
        assert_eq!(item.line, 3);
    }

    #[test]
    fn empty_checkbox_still_yields_item() {
        let item = parse_action_line("* [ ]", 1).unwrap();
        assert_eq!(item.text, "");
        assert!(!item.completed);
    }

    #[test]
    fn uppercase_x_and_indentation_are_accepted() {
        let item = parse_action_line("    - [X] nested", 1).unwrap();
        assert!(item.completed);
        assert_eq!(item.text, "nested");
    }

    #[test]
    fn annotations_may_appear_in_any_order() {
        let item = parse_action_line("- [ ] [low] due: 2025-02-03 ship @bob-smith", 1).unwrap();
        assert_eq!(item.priority.as_deref(), Some("low"));
        assert_eq!(item.assignee.as_deref(), Some("bob-smith"));
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(item.text, "ship");
    }

    #[test]
    fn emails_and_links_are_not_annotations() {
        let item =
            parse_action_line("- [ ] mail ops@example.com about [runbook](http://x/y)", 1).unwrap();
        assert_eq!(item.assignee, None);
        assert_eq!(item.priority, None);
        assert_eq!(item.text, "mail ops@example.com about [runbook](http://x/y)");
    }

    #[test]
    fn impossible_due_date_stays_in_text() {
        let item = parse_action_line("- [ ] file taxes Due: 2025-02-30", 1).unwrap();
        assert_eq!(item.due_date, None);
        assert!(item.text.contains("2025-02-30"));
    }

    #[test]
    fn internal_separators_survive() {
        let item = parse_action_line("- [ ] Compare A - B", 1).unwrap();
        assert_eq!(item.text, "Compare A - B");
    }

    #[test]
    fn non_checklist_lines_are_ignored() {
        let items = extract_action_items("# Title\n- plain bullet\n[ ] no marker\n- [ ] real\n-[ ] tight");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line, 4);
    }
}
