//! Domain model for parsed documents.
//!
//! # Responsibility
//! - Define the metadata value model, filing categories and the per-document
//!   aggregate produced by parsing.
//!
//! # Invariants
//! - The filesystem is the only source of truth; nothing here is persisted
//!   except through `crate::service::note_updater`.

pub mod category;
pub mod metadata;
pub mod note;
