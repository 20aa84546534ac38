//! Pre-mutation document snapshots.
//!
//! # Responsibility
//! - Copy a document's current bytes into the backup side directory.
//!
//! # Invariants
//! - Snapshots are byte-for-byte copies of the source at snapshot time.
//! - Names are `<stem>_<YYYYmmdd_HHMMSS>[_<n>].<ext>`; an existing snapshot is
//!   never overwritten (`create_new`), colliding names get a counter.
//! - Any failure is returned to the caller; nothing is skipped silently.
//! - Snapshots are never deleted by the engine.

use crate::config::EngineConfig;
use chrono::{Local, NaiveDateTime};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MAX_COLLISION_SUFFIX: u32 = 9_999;
const FALLBACK_STEM: &str = "document";

pub type BackupResult<T> = Result<T, BackupError>;

/// Snapshot failure.
#[derive(Debug)]
pub enum BackupError {
    /// Source document cannot be read.
    SourceUnreadable { path: PathBuf, source: io::Error },
    /// Backup directory cannot be created.
    BackupDirUnwritable { path: PathBuf, source: io::Error },
    /// Snapshot file cannot be created or written.
    SnapshotWrite { path: PathBuf, source: io::Error },
    /// Every collision suffix for this second is taken.
    NamesExhausted { path: PathBuf },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnreadable { path, source } => {
                write!(f, "cannot read `{}` for backup: {source}", path.display())
            }
            Self::BackupDirUnwritable { path, source } => write!(
                f,
                "cannot create backup directory `{}`: {source}",
                path.display()
            ),
            Self::SnapshotWrite { path, source } => {
                write!(f, "cannot write backup `{}`: {source}", path.display())
            }
            Self::NamesExhausted { path } => write!(
                f,
                "no free backup name left for `{}` in this second",
                path.display()
            ),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SourceUnreadable { source, .. } => Some(source),
            Self::BackupDirUnwritable { source, .. } => Some(source),
            Self::SnapshotWrite { source, .. } => Some(source),
            Self::NamesExhausted { .. } => None,
        }
    }
}

/// Writes snapshots into `<root>/<backup_dir>`.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
    extension: String,
}

impl BackupManager {
    /// Creates a manager for documents under `root`.
    pub fn new(root: impl AsRef<Path>, config: &EngineConfig) -> Self {
        Self {
            backup_dir: root.as_ref().join(config.backup_dir.trim()),
            extension: config.backup_extension.trim().to_string(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Snapshots `path` using the current local time.
    pub fn snapshot(&self, path: impl AsRef<Path>) -> BackupResult<PathBuf> {
        self.snapshot_at(path, Local::now().naive_local())
    }

    /// Snapshots `path`, naming the copy after `taken_at`.
    ///
    /// # Errors
    /// - `SourceUnreadable`, `BackupDirUnwritable`, `SnapshotWrite` or
    ///   `NamesExhausted`; on any error no partial snapshot is left behind.
    pub fn snapshot_at(
        &self,
        path: impl AsRef<Path>,
        taken_at: NaiveDateTime,
    ) -> BackupResult<PathBuf> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BackupError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        fs::create_dir_all(&self.backup_dir).map_err(|source| {
            error!(
                "event=backup_snapshot module=storage status=error error_code=backup_dir_unwritable backup_dir={}",
                self.backup_dir.display()
            );
            BackupError::BackupDirUnwritable {
                path: self.backup_dir.clone(),
                source,
            }
        })?;

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| FALLBACK_STEM.to_string());
        let timestamp = taken_at.format("%Y%m%d_%H%M%S").to_string();

        for attempt in 0..=MAX_COLLISION_SUFFIX {
            let candidate = self.backup_dir.join(self.file_name(&stem, &timestamp, attempt));
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => {
                    return Err(BackupError::SnapshotWrite {
                        path: candidate,
                        source,
                    })
                }
            };

            if let Err(source) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
                drop(file);
                let _ = fs::remove_file(&candidate);
                error!(
                    "event=backup_snapshot module=storage status=error error_code=snapshot_write_failed backup={}",
                    candidate.display()
                );
                return Err(BackupError::SnapshotWrite {
                    path: candidate,
                    source,
                });
            }

            info!(
                "event=backup_snapshot module=storage status=ok source={} backup={} bytes={}",
                path.display(),
                candidate.display(),
                bytes.len()
            );
            return Ok(candidate);
        }

        Err(BackupError::NamesExhausted {
            path: path.to_path_buf(),
        })
    }

    fn file_name(&self, stem: &str, timestamp: &str, attempt: u32) -> String {
        if attempt == 0 {
            format!("{stem}_{timestamp}.{}", self.extension)
        } else {
            format!("{stem}_{timestamp}_{attempt}.{}", self.extension)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackupError, BackupManager};
    use crate::config::EngineConfig;
    use chrono::NaiveDate;
    use std::fs;

    #[test]
    fn snapshot_copies_bytes_with_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("plan.md");
        fs::write(&doc, b"---\na: 1\n---\nbody").unwrap();
        let manager = BackupManager::new(dir.path(), &EngineConfig::default());
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();

        let backup = manager.snapshot_at(&doc, at).unwrap();

        assert_eq!(
            backup,
            dir.path().join(".backups").join("plan_20250102_030405.bak")
        );
        assert_eq!(fs::read(&backup).unwrap(), fs::read(&doc).unwrap());
    }

    #[test]
    fn same_second_snapshots_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("plan.md");
        fs::write(&doc, "v1").unwrap();
        let manager = BackupManager::new(dir.path(), &EngineConfig::default());
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();

        let first = manager.snapshot_at(&doc, at).unwrap();
        fs::write(&doc, "v2").unwrap();
        let second = manager.snapshot_at(&doc, at).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "v1");
        assert_eq!(fs::read_to_string(&second).unwrap(), "v2");
        assert!(second.ends_with("plan_20250102_030405_1.bak"));
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), &EngineConfig::default());
        let err = manager.snapshot(dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, BackupError::SourceUnreadable { .. }));
        assert!(!manager.backup_dir().exists());
    }

    #[test]
    fn blocked_backup_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("plan.md");
        fs::write(&doc, "v1").unwrap();
        // A regular file where the backup directory should be.
        fs::write(dir.path().join(".backups"), "not a dir").unwrap();
        let manager = BackupManager::new(dir.path(), &EngineConfig::default());

        let err = manager.snapshot(&doc).unwrap_err();
        assert!(matches!(err, BackupError::BackupDirUnwritable { .. }));
    }
}
