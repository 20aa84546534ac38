//! Cross-note action item search.

use crate::config::EngineConfig;
use crate::model::note::{ActionItem, NoteModel};
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Query construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionQueryError {
    /// `mine` was requested but no `user_name` is configured.
    MissingUserName,
}

impl Display for ActionQueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUserName => {
                write!(f, "no user_name configured; cannot resolve \"my\" actions")
            }
        }
    }
}

impl Error for ActionQueryError {}

/// Filters applied to every action item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQuery {
    /// Open, unassigned, and undated or past due.
    pub orphaned: bool,
    /// Case-insensitive handle, with or without `@`.
    pub assignee: Option<String>,
    pub include_completed: bool,
    /// Reference date for due-date comparisons.
    pub today: NaiveDate,
}

impl ActionQuery {
    /// Open items only, no other filter.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            orphaned: false,
            assignee: None,
            include_completed: false,
            today,
        }
    }

    pub fn orphaned(mut self) -> Self {
        self.orphaned = true;
        self
    }

    pub fn assigned_to(mut self, handle: impl Into<String>) -> Self {
        self.assignee = Some(handle.into());
        self
    }

    pub fn with_completed(mut self, include_completed: bool) -> Self {
        self.include_completed = include_completed;
        self
    }

    /// Restricts to items assigned to the configured `user_name`.
    ///
    /// # Errors
    /// - `MissingUserName` when the config has no usable `user_name`.
    pub fn mine(self, config: &EngineConfig) -> Result<Self, ActionQueryError> {
        let user = config
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ActionQueryError::MissingUserName)?;
        Ok(self.assigned_to(user))
    }

    pub fn matches(&self, item: &ActionItem) -> bool {
        if self.orphaned && !item.is_orphaned(self.today) {
            return false;
        }
        if item.completed && !self.include_completed {
            return false;
        }
        match &self.assignee {
            Some(wanted) => item
                .assignee
                .as_deref()
                .is_some_and(|actual| same_handle(actual, wanted)),
            None => true,
        }
    }
}

fn same_handle(actual: &str, wanted: &str) -> bool {
    let wanted = wanted.trim().trim_start_matches('@');
    actual.eq_ignore_ascii_case(wanted)
}

/// One matching item and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionHit {
    pub path: Option<PathBuf>,
    pub title: Option<String>,
    pub item: ActionItem,
}

impl ActionHit {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.item.is_overdue(today)
    }
}

/// Collects matching items in note order, then line order.
pub fn find_actions(notes: &[NoteModel], query: &ActionQuery) -> Vec<ActionHit> {
    notes
        .iter()
        .flat_map(|note| {
            note.action_items
                .iter()
                .filter(|item| query.matches(item))
                .map(|item| ActionHit {
                    path: note.path.clone(),
                    title: note.title.clone(),
                    item: item.clone(),
                })
        })
        .collect()
}
