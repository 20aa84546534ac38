//! Engine use-case services.
//!
//! # Responsibility
//! - Compose parsing, extraction, categorization and storage into the
//!   operations callers use: parse one note, update one note, process a
//!   directory, search action items.
//! - Keep the CLI decoupled from parsing and filesystem details.

pub mod action_service;
pub mod batch_service;
pub mod note_service;
pub mod note_updater;
