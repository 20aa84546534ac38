//! Numeric date reference extraction.
//!
//! Grammar: `YYYY-MM-DD`, optionally followed by blanks and `HH:MM`,
//! optionally followed by `:SS`. Recognition is purely lexical.

use crate::model::note::{DatePrecision, DateRef};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Calendar-date part of the grammar, shared with the action item extractor.
pub(crate) const DATE_GRAMMAR: &str = r"[0-9]{4}-[0-9]{2}-[0-9]{2}";

// ASCII digits only. The trailing class stands in for a lookahead: the date
// must not run into another digit, but may touch letters (`2025-01-01T10:00`).
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<text>(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})(?:[ \t]+(?P<hour>[0-9]{2}):(?P<minute>[0-9]{2})(?::(?P<second>[0-9]{2}))?)?)(?:[^0-9]|$)",
    )
    .expect("valid date regex")
});

/// Extracts date references in source order.
///
/// Line numbers are 1-based and relative to `body`.
pub fn extract_dates(body: &str) -> Vec<DateRef> {
    let mut dates = Vec::new();
    for (index, line) in body.lines().enumerate() {
        for caps in DATE_RE.captures_iter(line) {
            let number = |group: &str| caps.name(group).and_then(|m| m.as_str().parse::<u32>().ok());
            let hour = number("hour");
            let minute = number("minute");
            dates.push(DateRef {
                text: caps
                    .name("text")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                year: number("year").map_or(0, |year| year as i32),
                month: number("month").unwrap_or(0),
                day: number("day").unwrap_or(0),
                hour,
                minute,
                second: number("second"),
                precision: if hour.is_some() {
                    DatePrecision::DateTime
                } else {
                    DatePrecision::Date
                },
                line: index + 1,
            });
        }
    }
    dates
}

/// Parses one `YYYY-MM-DD` token into a calendar date.
///
/// Returns `None` for lexically valid but impossible dates.
pub fn parse_calendar_date(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::{extract_dates, parse_calendar_date};
    use crate::model::note::DatePrecision;

    #[test]
    fn recognizes_date_and_datetime_forms() {
        let dates = extract_dates("Kickoff 2025-03-04\nReview 2025-03-05 14:30 then 2025-03-06 09:15:45");
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0].precision, DatePrecision::Date);
        assert_eq!(dates[0].line, 1);
        assert_eq!(dates[1].text, "2025-03-05 14:30");
        assert_eq!(dates[1].precision, DatePrecision::DateTime);
        assert_eq!(dates[1].second, None);
        assert_eq!(dates[2].second, Some(45));
        assert_eq!(dates[2].line, 2);
    }

    #[test]
    fn does_not_match_inside_longer_digit_runs() {
        assert!(extract_dates("id 12025-01-01 and 2025-01-011").is_empty());
    }

    #[test]
    fn keeps_invalid_calendar_values_lexically() {
        let dates = extract_dates("bogus 2025-13-45");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].month, 13);
        assert!(dates[0].to_date().is_none());
    }

    #[test]
    fn partial_time_falls_back_to_date_only() {
        let dates = extract_dates("at 2025-01-01 9:30");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].text, "2025-01-01");
    }

    #[test]
    fn only_ascii_digits_form_dates() {
        assert!(extract_dates("٢٠٢٥-٠١-٠١").is_empty());
    }

    #[test]
    fn iso_timestamp_keeps_its_date_part() {
        let dates = extract_dates("at 2025-01-01T10:00, then 2025-01-02/2025-01-03");
        let texts = dates.iter().map(|d| d.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["2025-01-01", "2025-01-02", "2025-01-03"]);
        assert_eq!(dates[0].day, 1);
        assert_eq!(dates[0].precision, DatePrecision::Date);
    }

    #[test]
    fn natural_language_is_ignored() {
        assert!(extract_dates("next Tuesday at noon").is_empty());
    }

    #[test]
    fn parse_calendar_date_validates() {
        assert!(parse_calendar_date("2025-02-28").is_some());
        assert!(parse_calendar_date("2025-02-30").is_none());
    }
}
