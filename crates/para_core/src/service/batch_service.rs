//! Directory-wide batch processing.
//!
//! # Responsibility
//! - Enumerate matching documents under a directory, run the parse pipeline
//!   on each and aggregate a summary.
//!
//! # Invariants
//! - One file's failure never stops the run; it lands in `failures`.
//! - Only a missing/non-directory root or an invalid pattern aborts the run.
//! - Graceful parsing unless the caller asks for strict.
//! - Traversal is file-name sorted and never enters the backup directory.
//!
//! # See also
//! - `service::note_service` for the per-file pipeline.

use crate::config::EngineConfig;
use crate::model::category::Category;
use crate::model::note::NoteModel;
use crate::parse::frontmatter::ParseMode;
use crate::service::note_service::NoteService;
use glob::Pattern;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::{DirEntry, WalkDir};

pub type BatchResult<T> = Result<T, BatchError>;

/// Run-level failure. Per-file problems are never reported here.
#[derive(Debug)]
pub enum BatchError {
    DirectoryNotFound { path: PathBuf },
    NotADirectory { path: PathBuf },
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotFound { path } => {
                write!(f, "directory not found: `{}`", path.display())
            }
            Self::NotADirectory { path } => write!(f, "not a directory: `{}`", path.display()),
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern `{pattern}`: {source}")
            }
        }
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Per-run knobs layered over `EngineConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub mode: ParseMode,
    /// Overrides `EngineConfig::recursive` when set.
    pub recursive: Option<bool>,
}

/// A file that could not be processed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate numbers for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_words: usize,
    /// Every category is present, zero counts included.
    pub category_distribution: BTreeMap<Category, usize>,
    pub total_actions: usize,
    pub completed_actions: usize,
    /// `completed_actions / total_actions`; `0.0` when there are no actions.
    pub completion_ratio: f64,
    /// Files parsed with a downgraded metadata warning.
    pub warnings: usize,
}

impl BatchSummary {
    pub fn from_notes(notes: &[NoteModel], failures: usize) -> Self {
        let mut category_distribution = Category::ALL
            .iter()
            .map(|category| (*category, 0))
            .collect::<BTreeMap<_, _>>();
        let mut total_words = 0;
        let mut total_actions = 0;
        let mut completed_actions = 0;
        let mut warnings = 0;

        for note in notes {
            *category_distribution.entry(note.category).or_insert(0) += 1;
            total_words += note.stats.word_count;
            total_actions += note.action_items.len();
            completed_actions += note.completed_action_count();
            if note.parse_warning.is_some() {
                warnings += 1;
            }
        }

        let completion_ratio = if total_actions == 0 {
            0.0
        } else {
            completed_actions as f64 / total_actions as f64
        };

        Self {
            files_processed: notes.len(),
            files_failed: failures,
            total_words,
            category_distribution,
            total_actions,
            completed_actions,
            completion_ratio,
            warnings,
        }
    }
}

/// Per-file results plus the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub pattern: String,
    pub notes: Vec<NoteModel>,
    pub failures: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

/// Runs the parse pipeline over directories.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    notes: NoteService,
    default_pattern: String,
    recursive: bool,
    backup_dir: String,
}

impl BatchProcessor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            notes: NoteService::new(config),
            default_pattern: config.default_pattern.clone(),
            recursive: config.recursive,
            backup_dir: config.backup_dir.trim().to_string(),
        }
    }

    /// Processes every file under `directory` matching `pattern`.
    ///
    /// The pattern matches the file name, or the `/`-separated path relative
    /// to `directory` when it contains a `/`. `None` uses the configured
    /// default pattern.
    ///
    /// # Errors
    /// - `DirectoryNotFound`, `NotADirectory` or `InvalidPattern` only.
    pub fn process(
        &self,
        directory: impl AsRef<Path>,
        pattern: Option<&str>,
        options: BatchOptions,
    ) -> BatchResult<BatchReport> {
        let root = directory.as_ref();
        let pattern_text = pattern.unwrap_or(self.default_pattern.as_str()).to_string();
        let matcher = Pattern::new(&pattern_text).map_err(|source| BatchError::InvalidPattern {
            pattern: pattern_text.clone(),
            source,
        })?;
        if !root.exists() {
            return Err(BatchError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(BatchError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let recursive = options.recursive.unwrap_or(self.recursive);
        let started = Instant::now();
        info!(
            "event=batch_run module=service status=start root={} pattern={} recursive={}",
            root.display(),
            pattern_text,
            recursive
        );

        let mut notes = Vec::new();
        let mut failures = Vec::new();
        for path in self.enumerate(root, &matcher, recursive, &mut failures) {
            match self.notes.parse_file(&path, options.mode) {
                Ok(note) => {
                    debug!(
                        "event=batch_file module=service status=ok path={}",
                        path.display()
                    );
                    notes.push(note);
                }
                Err(err) => {
                    warn!(
                        "event=batch_file module=service status=error path={}",
                        path.display()
                    );
                    failures.push(BatchFailure {
                        path,
                        error: err.to_string(),
                    });
                }
            }
        }

        let summary = BatchSummary::from_notes(&notes, failures.len());
        info!(
            "event=batch_run module=service status=ok root={} files={} failed={} warnings={} duration_ms={}",
            root.display(),
            summary.files_processed,
            summary.files_failed,
            summary.warnings,
            started.elapsed().as_millis()
        );

        Ok(BatchReport {
            root: root.to_path_buf(),
            pattern: pattern_text,
            notes,
            failures,
            summary,
        })
    }

    fn enumerate(
        &self,
        root: &Path,
        matcher: &Pattern,
        recursive: bool,
        failures: &mut Vec<BatchFailure>,
    ) -> Vec<PathBuf> {
        let match_relative = matcher.as_str().contains('/');
        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut paths = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|entry| !self.is_backup_dir(entry))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    failures.push(BatchFailure {
                        path,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }
            let candidate = if match_relative {
                relative_slash_path(root, entry.path())
            } else {
                entry.file_name().to_string_lossy().into_owned()
            };
            if matcher.matches(&candidate) {
                paths.push(entry.into_path());
            }
        }
        paths
    }

    fn is_backup_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry.file_name().to_string_lossy() == self.backup_dir
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::{relative_slash_path, BatchSummary};
    use std::path::Path;

    #[test]
    fn empty_summary_has_every_category_and_zero_ratio() {
        let summary = BatchSummary::from_notes(&[], 0);
        assert_eq!(summary.category_distribution.len(), 5);
        assert!(summary.category_distribution.values().all(|count| *count == 0));
        assert_eq!(summary.completion_ratio, 0.0);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/notes");
        let path = root.join("work").join("plan.md");
        assert_eq!(relative_slash_path(root, &path), "work/plan.md");
    }
}
