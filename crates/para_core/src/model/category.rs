//! PARA filing categories.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed set of filing buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    /// Time-boxed work with a deadline.
    Projects,
    /// Ongoing responsibility without an end date.
    Areas,
    /// Reference material.
    Resources,
    /// Inactive items from the other buckets.
    Archive,
    /// Not confidently classifiable yet.
    Inbox,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Projects,
        Category::Areas,
        Category::Resources,
        Category::Archive,
        Category::Inbox,
    ];

    /// Categories that own a keyword table. `Inbox` is fallback-only.
    pub const SCORED: [Category; 4] = [
        Category::Projects,
        Category::Areas,
        Category::Resources,
        Category::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::Areas => "Areas",
            Self::Resources => "Resources",
            Self::Archive => "Archive",
            Self::Inbox => "Inbox",
        }
    }

    /// Parses a category name case-insensitively.
    ///
    /// Singular forms and common spellings are accepted (`project`,
    /// `archived`, `1-projects`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let name = normalized
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start_matches(['-', '_', '.', ' ']);
        match name {
            "projects" | "project" => Some(Self::Projects),
            "areas" | "area" => Some(Self::Areas),
            "resources" | "resource" => Some(Self::Resources),
            "archive" | "archives" | "archived" => Some(Self::Archive),
            "inbox" => Some(Self::Inbox),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("unknown category `{s}`; expected projects|areas|resources|archive|inbox")
        })
    }
}

/// How a category decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Metadata declared the category explicitly.
    Hint,
    /// One category scored strictly highest at or above threshold.
    Scored,
    /// Highest score stayed below the threshold.
    BelowThreshold,
    /// Two or more categories shared the highest score.
    Tie,
}

/// Categorizer output with its score breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub category: Category,
    pub source: CategorySource,
    /// Score per keyword-table category. Empty when a hint decided.
    pub scores: BTreeMap<Category, u32>,
}
