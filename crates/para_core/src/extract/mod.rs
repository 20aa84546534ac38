//! Content extractors.
//!
//! # Responsibility
//! - Recognize action items, people, dates and tags in document text.
//!
//! # Invariants
//! - Every extractor is a total function: arbitrary input (empty, binary-ish,
//!   very long lines) yields a possibly empty result and never panics.
//! - Extractors are independent and pure; none observes another's output.

pub mod actions;
pub mod dates;
pub mod people;
pub mod tags;
