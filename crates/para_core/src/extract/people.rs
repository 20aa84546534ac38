//! Attendee/participant extraction.
//!
//! # Invariants
//! - Only lines labelled `Attendees:` or `Participants:` (any case, optional
//!   bullet or bold markup) start a people list.
//! - Bullet lines directly below a label line continue that list. A label
//!   with nothing after its colon is also continued by plain lines, up to
//!   the first blank line.
//! - Output is de-duplicated by full segment text, first occurrence wins.

use crate::model::note::Person;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*+]\s+)?(?:\*\*|__)?(?:attendees|participants)(?:\*\*|__)?\s*:(?:\*\*|__)?(.*)$")
        .expect("valid people label regex")
});
static CONTINUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid continuation regex"));
static CHECKBOX_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[ xX]\]").expect("valid checkbox prefix regex"));
static ANGLE_EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*([^<>\s]+@[^<>\s]+)\s*>").expect("valid angle email regex"));
static BARE_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Extracts distinct people in order of first appearance.
pub fn extract_people(body: &str) -> Vec<Person> {
    let mut seen = HashSet::new();
    let mut people = Vec::new();
    let mut lines = body.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(caps) = LABEL_RE.captures(line) else {
            continue;
        };
        let mut segments = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let bare_label = segments.trim().is_empty();
        while let Some(&next) = lines.peek() {
            let Some(item) = continuation(next, bare_label) else {
                break;
            };
            segments.push('\n');
            segments.push_str(item);
            lines.next();
        }

        for segment in segments.split([',', ';', '\n']) {
            let Some(person) = parse_person(segment) else {
                continue;
            };
            if seen.insert(person.name.clone()) {
                people.push(person);
            }
        }
    }

    people
}

/// Returns the names carried by a line that continues a people list.
///
/// Bullets always continue; plain lines continue only a label with nothing
/// after its colon. Blank lines, headings, checklist items and new labels
/// end the list.
fn continuation(line: &str, bare_label: bool) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || LABEL_RE.is_match(line) {
        return None;
    }
    if let Some(item) = CONTINUATION_RE.captures(line).and_then(|caps| caps.get(1)) {
        return (!CHECKBOX_PREFIX_RE.is_match(item.as_str())).then_some(item.as_str());
    }
    (bare_label && !CHECKBOX_PREFIX_RE.is_match(trimmed)).then_some(trimmed)
}

fn parse_person(segment: &str) -> Option<Person> {
    let name = segment.trim().trim_matches(|c: char| c == '*' || c == '_').trim();
    if name.is_empty() {
        return None;
    }
    let email = ANGLE_EMAIL_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            BARE_EMAIL_RE
                .is_match(name)
                .then(|| name.to_string())
        });
    Some(Person {
        name: name.to_string(),
        email,
    })
}
