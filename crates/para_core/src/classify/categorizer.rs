//! Weighted keyword categorizer.
//!
//! # Responsibility
//! - Pick exactly one PARA category for a document.
//!
//! # Invariants
//! - An explicit, recognizable category hint in metadata always wins.
//! - Otherwise the strictly highest score at or above the threshold wins; a
//!   tie for highest or a sub-threshold maximum yields `Inbox`.
//! - Deterministic and side-effect free.

use crate::classify::keywords::{build_tables, KeywordTable};
use crate::config::{EngineConfig, DEFAULT_CATEGORY_THRESHOLD};
use crate::model::category::{Categorization, Category, CategorySource};
use crate::model::metadata::{MetaValue, Metadata};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata fields read as explicit category hints, in priority order.
pub const CATEGORY_HINT_FIELDS: &[&str] = &["category", "para"];

/// Keyword-table categorizer.
#[derive(Debug, Clone)]
pub struct Categorizer {
    tables: Vec<KeywordTable>,
    threshold: u32,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::with_tables(
            build_tables(&Default::default()),
            DEFAULT_CATEGORY_THRESHOLD,
        )
    }
}

impl Categorizer {
    /// Builds tables and threshold from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_tables(
            build_tables(&config.category_keywords),
            config.category_threshold,
        )
    }

    pub fn with_tables(tables: Vec<KeywordTable>, threshold: u32) -> Self {
        Self { tables, threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Categorizes one document.
    ///
    /// Scored text is every metadata value, the body, and the extracted tags.
    pub fn categorize(
        &self,
        metadata: &Metadata,
        body: &str,
        tags: &BTreeSet<String>,
    ) -> Categorization {
        if let Some(category) = category_hint(metadata) {
            return Categorization {
                category,
                source: CategorySource::Hint,
                scores: BTreeMap::new(),
            };
        }

        let mut text = metadata.text_content();
        text.push('\n');
        text.push_str(body);
        for tag in tags {
            text.push(' ');
            text.push_str(tag);
        }

        let scores = self.score_text(&text);
        self.decide(scores)
    }

    /// Scores text against every table.
    pub fn score_text(&self, text: &str) -> BTreeMap<Category, u32> {
        self.tables
            .iter()
            .map(|table| (table.category, table.score(text)))
            .collect()
    }

    fn decide(&self, scores: BTreeMap<Category, u32>) -> Categorization {
        let best = scores.values().copied().max().unwrap_or(0);
        let leaders = scores.values().filter(|score| **score == best).count();

        let (category, source) = if best < self.threshold {
            (Category::Inbox, CategorySource::BelowThreshold)
        } else if leaders != 1 {
            (Category::Inbox, CategorySource::Tie)
        } else {
            let winner = scores
                .iter()
                .find(|(_, score)| **score == best)
                .map(|(category, _)| *category)
                .unwrap_or(Category::Inbox);
            (winner, CategorySource::Scored)
        };

        Categorization {
            category,
            source,
            scores,
        }
    }
}

/// Reads the first recognizable category hint from metadata.
pub fn category_hint(metadata: &Metadata) -> Option<Category> {
    CATEGORY_HINT_FIELDS
        .iter()
        .filter_map(|field| metadata.get(field))
        .find_map(|value| match value {
            MetaValue::String(text) => Category::parse(text),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::{category_hint, Categorizer};
    use crate::classify::keywords::{KeywordTable, Weight};
    use crate::config::KeywordTiers;
    use crate::model::category::{Category, CategorySource};
    use crate::model::metadata::{MetaValue, Metadata};
    use std::collections::BTreeSet;

    fn categorize(metadata: &Metadata, body: &str) -> (Category, CategorySource) {
        let result = Categorizer::default().categorize(metadata, body, &BTreeSet::new());
        (result.category, result.source)
    }

    #[test]
    fn hint_wins_over_keywords() {
        let mut metadata = Metadata::new();
        metadata.insert("category", "resources".into());
        let (category, source) = categorize(&metadata, "project deadline milestone");
        assert_eq!(category, Category::Resources);
        assert_eq!(source, CategorySource::Hint);
    }

    #[test]
    fn unrecognized_hint_falls_through_to_scoring() {
        let mut metadata = Metadata::new();
        metadata.insert("category", "someday".into());
        metadata.insert("para", MetaValue::Integer(1));
        assert_eq!(category_hint(&metadata), None);
        let (category, _) = categorize(&metadata, "project plan");
        assert_eq!(category, Category::Projects);
    }

    #[test]
    fn repeated_high_keyword_counts_once_and_meets_threshold() {
        let result = Categorizer::default().categorize(
            &Metadata::new(),
            "project project project project project project",
            &BTreeSet::new(),
        );
        assert_eq!(result.scores[&Category::Projects], 3);
        assert_eq!(result.category, Category::Projects);
        assert_eq!(result.source, CategorySource::Scored);
    }

    #[test]
    fn below_threshold_goes_to_inbox() {
        let (category, source) = categorize(&Metadata::new(), "an old photo");
        assert_eq!(category, Category::Inbox);
        assert_eq!(source, CategorySource::BelowThreshold);
    }

    #[test]
    fn tie_goes_to_inbox() {
        let (category, source) = categorize(&Metadata::new(), "project reference");
        assert_eq!(category, Category::Inbox);
        assert_eq!(source, CategorySource::Tie);
    }

    #[test]
    fn metadata_values_are_scored() {
        let mut metadata = Metadata::new();
        metadata.insert("type", "tutorial".into());
        let (category, _) = categorize(&metadata, "");
        assert_eq!(category, Category::Resources);
    }

    #[test]
    fn custom_tables_and_threshold() {
        let table = KeywordTable::from_tiers(
            Category::Areas,
            &KeywordTiers {
                low: vec!["garden".to_string()],
                ..KeywordTiers::default()
            },
        );
        let categorizer = Categorizer::with_tables(vec![table], 1);
        let result = categorizer.categorize(&Metadata::new(), "Garden log", &BTreeSet::new());
        assert_eq!(result.category, Category::Areas);
        assert_eq!(Weight::Low.points(), 1);
    }

    #[test]
    fn categorization_is_idempotent() {
        let categorizer = Categorizer::default();
        let mut metadata = Metadata::new();
        metadata.insert("title", "Q3 launch roadmap".into());
        let body = "Milestone review with the team #sprint";
        let tags = BTreeSet::from(["sprint".to_string()]);
        let first = categorizer.categorize(&metadata, body, &tags);
        let second = categorizer.categorize(&metadata, body, &tags);
        assert_eq!(first, second);
    }
}
