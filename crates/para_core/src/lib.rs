//! PARA note processing engine.
//!
//! Parses Markdown notes with optional YAML frontmatter, extracts action
//! items, people, dates and tags, suggests a PARA category, and applies
//! backed-up atomic metadata updates.

pub mod classify;
pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod parse;
pub mod service;
pub mod storage;

pub use classify::categorizer::Categorizer;
pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Categorization, Category, CategorySource};
pub use model::metadata::{parse_edit, parse_edits, EditParseError, MetaValue, Metadata};
pub use model::note::{ActionItem, DatePrecision, DateRef, NoteModel, NoteStats, Person};
pub use parse::frontmatter::{
    parse_frontmatter, render_document, Frontmatter, FrontmatterError, ParseMode,
};
pub use service::action_service::{find_actions, ActionHit, ActionQuery, ActionQueryError};
pub use service::batch_service::{
    BatchError, BatchFailure, BatchOptions, BatchProcessor, BatchReport, BatchResult,
    BatchSummary,
};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::note_updater::{NoteUpdater, UpdateError, UpdateOutcome, UpdateResult};
pub use storage::backup::{BackupError, BackupManager, BackupResult};

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
