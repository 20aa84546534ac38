//! Human-readable renderings for terminal output.

use para_core::{ActionHit, ActionItem, BatchReport, BatchSummary, Categorization, NoteModel};
use std::fmt::Write;
use std::path::Path;

pub fn note(note: &NoteModel) -> String {
    let mut out = String::new();
    if let Some(path) = &note.path {
        let _ = writeln!(out, "path:       {}", path.display());
    }
    if let Some(title) = &note.title {
        let _ = writeln!(out, "title:      {title}");
    }
    let _ = writeln!(out, "category:   {}", categorization(&note.categorization));
    let _ = writeln!(
        out,
        "stats:      {} words, {} min read, {} metadata fields",
        note.stats.word_count, note.stats.reading_time_minutes, note.stats.metadata_fields
    );
    if !note.tags.is_empty() {
        let tags = note.tags.iter().cloned().collect::<Vec<_>>();
        let _ = writeln!(out, "tags:       {}", tags.join(", "));
    }
    if !note.people.is_empty() {
        let people = note
            .people
            .iter()
            .map(|person| person.name.as_str())
            .collect::<Vec<_>>();
        let _ = writeln!(out, "people:     {}", people.join(", "));
    }
    if !note.dates.is_empty() {
        let dates = note
            .dates
            .iter()
            .map(|date| date.text.as_str())
            .collect::<Vec<_>>();
        let _ = writeln!(out, "dates:      {}", dates.join(", "));
    }
    if !note.action_items.is_empty() {
        let _ = writeln!(
            out,
            "actions:    {}/{} done",
            note.completed_action_count(),
            note.action_items.len()
        );
        for item in &note.action_items {
            let _ = writeln!(out, "  {}", action_line(item));
        }
    }
    if let Some(warning) = &note.parse_warning {
        let _ = writeln!(out, "warning:    {warning}");
    }
    out
}

pub fn categorization(result: &Categorization) -> String {
    if result.scores.is_empty() {
        return format!("{} (from metadata)", result.category);
    }
    let scores = result
        .scores
        .iter()
        .map(|(category, score)| format!("{category}={score}"))
        .collect::<Vec<_>>();
    format!("{} ({})", result.category, scores.join(" "))
}

pub fn action_line(item: &ActionItem) -> String {
    let mut line = format!(
        "[{}] L{} {}",
        if item.completed { 'x' } else { ' ' },
        item.line,
        item.text
    );
    if let Some(assignee) = &item.assignee {
        let _ = write!(line, " @{assignee}");
    }
    if let Some(due) = item.due_date {
        let _ = write!(line, " due:{due}");
    }
    if let Some(priority) = &item.priority {
        let _ = write!(line, " [{priority}]");
    }
    line
}

pub fn action_hits(hits: &[ActionHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        let path = hit
            .path
            .as_deref()
            .map(Path::display)
            .map(|path| path.to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "{path}: {}", action_line(&hit.item));
    }
    let _ = writeln!(out, "{} action item(s)", hits.len());
    out
}

pub fn batch(report: &BatchReport, summary_only: bool) -> String {
    let mut out = String::new();
    if !summary_only {
        for note in &report.notes {
            let path = note
                .path
                .as_deref()
                .map(|path| path.strip_prefix(&report.root).unwrap_or(path))
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            let flag = if note.parse_warning.is_some() { " (warning)" } else { "" };
            let _ = writeln!(
                out,
                "{:<10} {:>6}w {:>3}/{:<3} {path}{flag}",
                note.category.as_str(),
                note.stats.word_count,
                note.completed_action_count(),
                note.action_items.len()
            );
        }
    }
    for failure in &report.failures {
        let _ = writeln!(out, "FAILED {}: {}", failure.path.display(), failure.error);
    }
    out.push_str(&summary(&report.summary));
    out
}

pub fn summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "files: {} processed, {} failed, {} with warnings",
        summary.files_processed, summary.files_failed, summary.warnings
    );
    let _ = writeln!(out, "words: {}", summary.total_words);
    let distribution = summary
        .category_distribution
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>();
    let _ = writeln!(out, "categories: {}", distribution.join(" "));
    let _ = writeln!(
        out,
        "actions: {}/{} completed ({:.1}%)",
        summary.completed_actions,
        summary.total_actions,
        summary.completion_ratio * 100.0
    );
    out
}

#[cfg(test)]
mod tests {
    use super::action_line;
    use chrono::NaiveDate;
    use para_core::ActionItem;

    #[test]
    fn action_line_shows_every_field() {
        let item = ActionItem {
            text: "Ship it".to_string(),
            completed: false,
            assignee: Some("alice".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            priority: Some("high".to_string()),
            line: 7,
        };
        assert_eq!(action_line(&item), "[ ] L7 Ship it @alice due:2025-03-01 [high]");
    }
}
