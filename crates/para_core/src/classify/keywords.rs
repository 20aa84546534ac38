//! Category keyword tables.
//!
//! # Invariants
//! - Matching is case-insensitive and whole-word: a term never matches inside
//!   a longer word (`plan` does not match `planet`).
//! - Internal whitespace in a multi-word term matches any whitespace run.

use crate::config::{KeywordOverrides, KeywordTiers};
use crate::model::category::Category;
use regex::Regex;

/// Weight tier of one keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    High,
    Medium,
    Low,
}

impl Weight {
    pub fn points(self) -> u32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// One compiled keyword.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub term: String,
    pub weight: Weight,
    pattern: Regex,
}

impl Keyword {
    /// Compiles a term. Blank terms yield `None`.
    pub fn new(term: &str, weight: Weight) -> Option<Self> {
        let words = term.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            return None;
        }
        let escaped = words.iter().map(|word| regex::escape(word)).collect::<Vec<_>>();
        let source = format!(r"(?i)(?:^|\W){}(?:\W|$)", escaped.join(r"\s+"));
        let pattern = Regex::new(&source).ok()?;
        Some(Self {
            term: words.join(" "),
            weight,
            pattern,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Keyword table for one category.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    pub category: Category,
    pub keywords: Vec<Keyword>,
}

impl KeywordTable {
    pub fn from_tiers(category: Category, tiers: &KeywordTiers) -> Self {
        let mut keywords = Vec::new();
        for (terms, weight) in [
            (&tiers.high, Weight::High),
            (&tiers.medium, Weight::Medium),
            (&tiers.low, Weight::Low),
        ] {
            keywords.extend(terms.iter().filter_map(|term| Keyword::new(term, weight)));
        }
        Self { category, keywords }
    }

    /// Sum of weights of distinct keywords present in `text`.
    ///
    /// A keyword counts once no matter how often it occurs.
    pub fn score(&self, text: &str) -> u32 {
        self.keywords
            .iter()
            .filter(|keyword| keyword.is_match(text))
            .map(|keyword| keyword.weight.points())
            .sum()
    }
}

fn tiers(high: &[&str], medium: &[&str], low: &[&str]) -> KeywordTiers {
    let owned = |terms: &[&str]| -> Vec<String> { terms.iter().map(|term| term.to_string()).collect() };
    KeywordTiers {
        high: owned(high),
        medium: owned(medium),
        low: owned(low),
    }
}

/// Built-in tiers for one scored category.
pub fn default_tiers(category: Category) -> KeywordTiers {
    match category {
        Category::Projects => tiers(
            &["project", "deadline", "milestone", "deliverable", "sprint"],
            &["launch", "roadmap", "due", "kickoff", "goal"],
            &["task", "plan", "next steps", "timeline"],
        ),
        Category::Areas => tiers(
            &["responsibility", "ongoing", "maintain", "routine", "area"],
            &["health", "finance", "habit", "standard", "recurring"],
            &["weekly", "monthly", "review", "manage"],
        ),
        Category::Resources => tiers(
            &["reference", "resource", "tutorial", "guide", "documentation"],
            &["article", "book", "research", "howto", "cheatsheet"],
            &["learn", "idea", "link", "example"],
        ),
        Category::Archive => tiers(
            &["archive", "archived", "deprecated", "obsolete", "retired"],
            &["completed", "inactive", "cancelled", "shelved"],
            &["old", "past", "former", "legacy"],
        ),
        Category::Inbox => KeywordTiers::default(),
    }
}

/// Builds the four scored tables, applying per-category overrides.
pub fn build_tables(overrides: &KeywordOverrides) -> Vec<KeywordTable> {
    Category::SCORED
        .iter()
        .map(|&category| {
            let override_tiers = match category {
                Category::Projects => overrides.projects.as_ref(),
                Category::Areas => overrides.areas.as_ref(),
                Category::Resources => overrides.resources.as_ref(),
                Category::Archive => overrides.archive.as_ref(),
                Category::Inbox => None,
            };
            match override_tiers {
                Some(tiers) => KeywordTable::from_tiers(category, tiers),
                None => KeywordTable::from_tiers(category, &default_tiers(category)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{build_tables, default_tiers, Keyword, KeywordTable, Weight};
    use crate::config::{KeywordOverrides, KeywordTiers};
    use crate::model::category::Category;
    use std::collections::HashSet;

    #[test]
    fn whole_word_case_insensitive_matching() {
        let keyword = Keyword::new("plan", Weight::Low).unwrap();
        assert!(keyword.is_match("The PLAN is set"));
        assert!(keyword.is_match("plan"));
        assert!(keyword.is_match("#plan"));
        assert!(!keyword.is_match("planet earth"));
        assert!(!keyword.is_match("airplan"));
    }

    #[test]
    fn multi_word_terms_match_across_whitespace() {
        let keyword = Keyword::new("next  steps", Weight::Low).unwrap();
        assert_eq!(keyword.term, "next steps");
        assert!(keyword.is_match("## Next\tSteps"));
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let table = KeywordTable::from_tiers(Category::Projects, &default_tiers(Category::Projects));
        assert_eq!(table.score("project project project"), 3);
    }

    #[test]
    fn default_tables_do_not_share_terms() {
        let mut seen = HashSet::new();
        for table in build_tables(&KeywordOverrides::default()) {
            for keyword in table.keywords {
                assert!(seen.insert(keyword.term.clone()), "duplicate {}", keyword.term);
            }
        }
    }

    #[test]
    fn override_replaces_only_named_category() {
        let overrides = KeywordOverrides {
            areas: Some(KeywordTiers {
                high: vec!["garden".to_string()],
                ..KeywordTiers::default()
            }),
            ..KeywordOverrides::default()
        };
        let tables = build_tables(&overrides);
        let areas = tables.iter().find(|t| t.category == Category::Areas).unwrap();
        assert_eq!(areas.keywords.len(), 1);
        let projects = tables.iter().find(|t| t.category == Category::Projects).unwrap();
        assert!(projects.keywords.len() > 1);
    }

    #[test]
    fn blank_terms_are_skipped() {
        assert!(Keyword::new("   ", Weight::High).is_none());
    }
}
