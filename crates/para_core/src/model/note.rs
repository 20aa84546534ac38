//! Note aggregate and extracted structures.
//!
//! # Responsibility
//! - Define the transient in-memory view built for one document.
//! - Derive body statistics (word count, reading time).
//!
//! # Invariants
//! - Every structure here is rebuilt from file text on each parse and is never
//!   persisted on its own.
//! - Line numbers stored on a `NoteModel` are 1-based document lines.

use crate::model::category::{Categorization, Category};
use crate::model::metadata::Metadata;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default words-per-minute used for reading time.
pub const DEFAULT_READING_SPEED_WPM: u32 = 200;

/// One checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    /// Description with assignee, due and priority tokens removed.
    pub text: String,
    pub completed: bool,
    /// Handle without the leading `@`.
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Lowercased bracket token, e.g. `high`.
    pub priority: Option<String>,
    /// 1-based source line.
    pub line: usize,
}

impl ActionItem {
    /// Open and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Open, unassigned, and either undated or past due.
    pub fn is_orphaned(&self, today: NaiveDate) -> bool {
        !self.completed
            && self.assignee.is_none()
            && self.due_date.map_or(true, |due| due < today)
    }
}

/// Attendee/participant reference. Text only; no identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Person {
    /// Full segment as written, e.g. `Jane Doe <jane@example.com>`.
    pub name: String,
    /// Bare email address, when the segment carries one.
    pub email: Option<String>,
}

/// Whether a date reference carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Date,
    DateTime,
}

/// Lexically recognized `YYYY-MM-DD[ HH:MM[:SS]]` occurrence.
///
/// Components are not calendar-validated; `to_date`/`to_datetime` return
/// `None` for impossible values such as month 13.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRef {
    /// Matched text.
    pub text: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub precision: DatePrecision,
    /// 1-based source line.
    pub line: usize,
}

impl DateRef {
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.to_date()?;
        let time = match (self.hour, self.minute) {
            (Some(hour), Some(minute)) => {
                NaiveTime::from_hms_opt(hour, minute, self.second.unwrap_or(0))?
            }
            _ => NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }
}

/// Derived body statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    /// Whitespace-delimited tokens in the body.
    pub word_count: usize,
    /// `ceil(word_count / wpm)` minutes.
    pub reading_time_minutes: usize,
    pub metadata_fields: usize,
}

impl NoteStats {
    /// Computes statistics. A zero `reading_speed_wpm` is treated as the
    /// default speed.
    pub fn compute(body: &str, metadata: &Metadata, reading_speed_wpm: u32) -> Self {
        let word_count = body.split_whitespace().count();
        let wpm = if reading_speed_wpm == 0 {
            DEFAULT_READING_SPEED_WPM
        } else {
            reading_speed_wpm
        } as usize;
        Self {
            word_count,
            reading_time_minutes: word_count.div_ceil(wpm),
            metadata_fields: metadata.len(),
        }
    }
}

/// Everything derived from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteModel {
    /// Source file, when parsed from disk.
    pub path: Option<PathBuf>,
    /// `title` field, else the first level-one heading.
    pub title: Option<String>,
    pub metadata: Metadata,
    #[serde(skip)]
    pub body: String,
    pub action_items: Vec<ActionItem>,
    pub people: Vec<Person>,
    pub dates: Vec<DateRef>,
    pub tags: BTreeSet<String>,
    pub category: Category,
    pub categorization: Categorization,
    pub stats: NoteStats,
    /// Downgraded frontmatter error (graceful mode).
    pub parse_warning: Option<String>,
}

impl NoteModel {
    pub fn completed_action_count(&self) -> usize {
        self.action_items.iter().filter(|item| item.completed).count()
    }
}
