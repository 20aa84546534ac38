//! Single-document parse pipeline.
//!
//! # Responsibility
//! - Run frontmatter parsing, every extractor, categorization and statistics
//!   for one document and fold the results into a `NoteModel`.
//!
//! # Invariants
//! - The pipeline is a pure function of (text, mode, config); files are
//!   re-read on every call and nothing is cached.
//! - Strict mode surfaces malformed metadata as an error; graceful mode
//!   attaches it to the model as `parse_warning`.
//! - Line numbers on the model are document lines, not body lines.

use crate::classify::categorizer::Categorizer;
use crate::config::EngineConfig;
use crate::extract::actions::extract_action_items;
use crate::extract::dates::extract_dates;
use crate::extract::people::extract_people;
use crate::extract::tags::extract_tags;
use crate::model::metadata::MetaValue;
use crate::model::note::{NoteModel, NoteStats};
use crate::parse::frontmatter::{parse_frontmatter, FrontmatterError, ParseMode};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Service error for single-document parsing.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Path does not exist.
    MissingFile { path: PathBuf, source: io::Error },
    /// Path exists but cannot be read as UTF-8 text.
    Read { path: PathBuf, source: io::Error },
    /// Metadata block is malformed (strict mode).
    Metadata {
        path: PathBuf,
        source: FrontmatterError,
    },
}

impl NoteServiceError {
    pub fn path(&self) -> &Path {
        match self {
            Self::MissingFile { path, .. } | Self::Read { path, .. } | Self::Metadata { path, .. } => {
                path.as_path()
            }
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile { path, .. } => write!(f, "file not found: `{}`", path.display()),
            Self::Read { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Metadata { path, source } => write!(f, "`{}`: {source}", path.display()),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile { source, .. } | Self::Read { source, .. } => Some(source),
            Self::Metadata { source, .. } => Some(source),
        }
    }
}

/// Reads a document as UTF-8, classifying missing files separately.
pub fn read_document(path: &Path) -> Result<String, NoteServiceError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            NoteServiceError::MissingFile {
                path: path.to_path_buf(),
                source,
            }
        } else {
            NoteServiceError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parse pipeline configured once and reused across documents.
#[derive(Debug, Clone)]
pub struct NoteService {
    categorizer: Categorizer,
    reading_speed_wpm: u32,
}

impl Default for NoteService {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl NoteService {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            categorizer: Categorizer::new(config),
            reading_speed_wpm: config.reading_speed_wpm,
        }
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Builds a note model from document text.
    ///
    /// # Errors
    /// - Strict mode only: the frontmatter error for malformed metadata.
    pub fn parse_text(&self, text: &str, mode: ParseMode) -> Result<NoteModel, FrontmatterError> {
        let frontmatter = parse_frontmatter(text, mode)?;
        let line_offset = frontmatter.body_start_line.saturating_sub(1);
        let metadata = frontmatter.metadata;
        let body = frontmatter.body;

        let mut action_items = extract_action_items(&body);
        for item in &mut action_items {
            item.line += line_offset;
        }
        let mut dates = extract_dates(&body);
        for date in &mut dates {
            date.line += line_offset;
        }
        let people = extract_people(&body);
        let tags = extract_tags(&metadata, &body);
        let categorization = self.categorizer.categorize(&metadata, &body, &tags);
        let stats = NoteStats::compute(&body, &metadata, self.reading_speed_wpm);
        let title = note_title(&metadata, &body);

        Ok(NoteModel {
            path: None,
            title,
            category: categorization.category,
            categorization,
            metadata,
            body,
            action_items,
            people,
            dates,
            tags,
            stats,
            parse_warning: frontmatter.warning.map(|warning| warning.to_string()),
        })
    }

    /// Reads and parses one file.
    ///
    /// # Errors
    /// - `MissingFile`/`Read` in every mode.
    /// - `Metadata` in strict mode for malformed metadata.
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        mode: ParseMode,
    ) -> Result<NoteModel, NoteServiceError> {
        let path = path.as_ref();
        let text = read_document(path)?;
        let mut note = self.parse_text(&text, mode).map_err(|source| {
            warn!(
                "event=note_parse module=service status=error error_code=metadata_malformed path={}",
                path.display()
            );
            NoteServiceError::Metadata {
                path: path.to_path_buf(),
                source,
            }
        })?;
        note.path = Some(path.to_path_buf());

        if note.parse_warning.is_some() {
            warn!(
                "event=note_parse module=service status=warn warning_code=metadata_malformed path={}",
                path.display()
            );
        } else {
            debug!(
                "event=note_parse module=service status=ok path={} words={} actions={}",
                path.display(),
                note.stats.word_count,
                note.action_items.len()
            );
        }
        Ok(note)
    }
}

/// Title from the `title` field, else the first level-one heading.
fn note_title(metadata: &crate::model::metadata::Metadata, body: &str) -> Option<String> {
    if let Some(MetaValue::String(title)) = metadata.get("title") {
        let trimmed = title.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
        .filter(|heading| !heading.is_empty())
}
