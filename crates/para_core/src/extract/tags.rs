//! Tag extraction from metadata and body hashtags.
//!
//! # Invariants
//! - Tags are trimmed, stripped of a leading `#`, lowercased and deduplicated.
//! - Metadata tags and body hashtags are unioned; each tag appears once.
//! - Hashtags inside fenced code blocks are ignored.

use crate::model::metadata::{MetaValue, Metadata};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Metadata key holding declared tags.
pub const TAGS_FIELD: &str = "tags";

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w&#/])#(\w+)").expect("valid hashtag regex"));

/// Extracts the union of metadata tags and body hashtags.
pub fn extract_tags(metadata: &Metadata, body: &str) -> BTreeSet<String> {
    let mut tags = metadata_tags(metadata);
    tags.extend(body_tags(body));
    tags
}

/// Tags declared in the metadata `tags` field (list or comma-separated).
pub fn metadata_tags(metadata: &Metadata) -> BTreeSet<String> {
    let raw = match metadata.get(TAGS_FIELD) {
        Some(MetaValue::String(value)) => value.split(',').map(str::to_string).collect(),
        Some(list @ MetaValue::List(_)) => list.as_string_list().unwrap_or_default(),
        Some(other) => other.scalar_text().into_iter().collect(),
        None => Vec::new(),
    };
    normalize_tags(&raw)
}

/// Hashtags found in body text outside fenced code blocks.
pub fn body_tags(body: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    let mut in_fence = false;
    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        for caps in HASHTAG_RE.captures_iter(line) {
            if let Some(tag) = caps.get(1).and_then(|m| normalize_tag(m.as_str())) {
                tags.insert(tag);
            }
        }
    }
    tags
}

/// Normalizes one tag value.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim().trim_start_matches('#').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter().filter_map(|tag| normalize_tag(tag)).collect()
}
