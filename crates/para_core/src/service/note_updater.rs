//! Backed-up, atomic metadata updates.
//!
//! # Responsibility
//! - Merge key/value edits into a document's metadata and write it back.
//!
//! # Invariants
//! - Order is fixed: read, strict parse, merge, render, snapshot, atomic write.
//! - Missing files and malformed metadata fail before any backup is taken.
//! - No mutation without a successful snapshot of the pre-update bytes.
//! - On failure the original file is byte-identical to its pre-call state.
//! - The body is written back unchanged.

use crate::config::EngineConfig;
use crate::model::category::Category;
use crate::model::metadata::{MetaValue, Metadata};
use crate::parse::frontmatter::{parse_frontmatter, render_document, FrontmatterError, ParseMode};
use crate::service::note_service::{read_document, NoteService, NoteServiceError};
use crate::storage::atomic::write_atomic;
use crate::storage::backup::{BackupError, BackupManager};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Metadata key written by `persist_category`.
pub const CATEGORY_FIELD: &str = "category";

pub type UpdateResult<T> = Result<T, UpdateError>;

/// Update failure.
#[derive(Debug)]
pub enum UpdateError {
    MissingFile { path: PathBuf, source: io::Error },
    Read { path: PathBuf, source: io::Error },
    /// Existing metadata cannot be parsed strictly.
    Metadata {
        path: PathBuf,
        source: FrontmatterError,
    },
    /// Snapshot failed; the document was not touched.
    Backup(BackupError),
    /// Merged metadata cannot be rendered.
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// Temp write or rename failed; the document was not touched.
    AtomicWrite { path: PathBuf, source: io::Error },
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile { path, .. } => write!(f, "file not found: `{}`", path.display()),
            Self::Read { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "refusing to update `{}`: {source}", path.display())
            }
            Self::Backup(err) => write!(f, "backup failed, update aborted: {err}"),
            Self::Serialize { path, source } => write!(
                f,
                "cannot serialize metadata for `{}`: {source}",
                path.display()
            ),
            Self::AtomicWrite { path, source } => write!(
                f,
                "cannot replace `{}` (original left untouched): {source}",
                path.display()
            ),
        }
    }
}

impl Error for UpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile { source, .. } | Self::Read { source, .. } => Some(source),
            Self::Metadata { source, .. } => Some(source),
            Self::Backup(err) => Some(err),
            Self::Serialize { source, .. } => Some(source),
            Self::AtomicWrite { source, .. } => Some(source),
        }
    }
}

impl From<BackupError> for UpdateError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

impl From<NoteServiceError> for UpdateError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::MissingFile { path, source } => Self::MissingFile { path, source },
            NoteServiceError::Read { path, source } => Self::Read { path, source },
            NoteServiceError::Metadata { path, source } => Self::Metadata { path, source },
        }
    }
}

impl UpdateError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingFile { .. } => "missing_file",
            Self::Read { .. } => "read_failed",
            Self::Metadata { .. } => "metadata_malformed",
            Self::Backup(_) => "backup_failed",
            Self::Serialize { .. } => "serialize_failed",
            Self::AtomicWrite { .. } => "atomic_write_failed",
        }
    }
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub path: PathBuf,
    /// Snapshot of the pre-update bytes.
    pub backup_path: PathBuf,
    /// Edited keys, in edit order.
    pub changed_keys: Vec<String>,
}

/// Applies metadata edits to documents under one root.
#[derive(Debug, Clone)]
pub struct NoteUpdater {
    backups: BackupManager,
    notes: NoteService,
}

impl NoteUpdater {
    /// Backups land in `<root>/<config.backup_dir>`.
    pub fn new(root: impl AsRef<Path>, config: &EngineConfig) -> Self {
        Self {
            backups: BackupManager::new(root, config),
            notes: NoteService::new(config),
        }
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Merges `edits` into the metadata of `path`.
    ///
    /// Top-level keys are added or overwritten; when both the existing and
    /// the new value are maps they are merged one level deep.
    ///
    /// # Errors
    /// - `MissingFile`/`Read`/`Metadata` before any backup is created.
    /// - `Backup` when the snapshot fails; the document is not modified.
    /// - `Serialize`/`AtomicWrite`; the document is not modified.
    pub fn update(&self, path: impl AsRef<Path>, edits: Metadata) -> UpdateResult<UpdateOutcome> {
        let path = path.as_ref();
        let started = Instant::now();
        info!(
            "event=note_update module=service status=start path={} edits={}",
            path.display(),
            edits.len()
        );

        let result = self.apply(path, edits);
        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(outcome) => info!(
                "event=note_update module=service status=ok path={} backup={} duration_ms={}",
                path.display(),
                outcome.backup_path.display(),
                duration_ms
            ),
            Err(err) => error!(
                "event=note_update module=service status=error error_code={} path={} duration_ms={}",
                err.code(),
                path.display(),
                duration_ms
            ),
        }
        result
    }

    /// Computes the document's category and stores it in `category`.
    ///
    /// Returns the stored category with the update outcome.
    pub fn persist_category(
        &self,
        path: impl AsRef<Path>,
    ) -> UpdateResult<(Category, UpdateOutcome)> {
        let path = path.as_ref();
        let note = self.notes.parse_file(path, ParseMode::Strict)?;
        let mut edits = Metadata::new();
        edits.insert(CATEGORY_FIELD, MetaValue::from(note.category.as_str()));
        let outcome = self.update(path, edits)?;
        Ok((note.category, outcome))
    }

    fn apply(&self, path: &Path, edits: Metadata) -> UpdateResult<UpdateOutcome> {
        let text = read_document(path)?;
        let frontmatter =
            parse_frontmatter(&text, ParseMode::Strict).map_err(|source| UpdateError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;

        let changed_keys = edits.keys().map(str::to_string).collect::<Vec<_>>();
        let mut metadata = frontmatter.metadata;
        metadata.merge(edits);

        let rendered =
            render_document(&metadata, &frontmatter.body).map_err(|source| UpdateError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;

        let backup_path = self.backups.snapshot(path)?;

        write_atomic(path, rendered.as_bytes()).map_err(|source| UpdateError::AtomicWrite {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(UpdateOutcome {
            path: path.to_path_buf(),
            backup_path,
            changed_keys,
        })
    }
}
