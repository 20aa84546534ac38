//! PARA category inference.
//!
//! # Responsibility
//! - Hold category keyword tables.
//! - Score documents and select one filing category.
//!
//! # Invariants
//! - Keyword matching is case-insensitive and whole-word.
//! - A keyword contributes its weight at most once per document.

pub mod categorizer;
pub mod keywords;
