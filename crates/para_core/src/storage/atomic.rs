//! Atomic file replacement.
//!
//! # Invariants
//! - Content is written to a temp file in the target's own directory and
//!   renamed over the target only after a full write and fsync.
//! - On any failure the target is untouched and the temp file is removed
//!   (the `NamedTempFile` guard deletes it on drop).
//! - An existing target's permissions carry over to the replacement.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Atomically replaces `path` with `contents`.
///
/// # Errors
/// - Returns the underlying I/O error from temp creation, write, sync or
///   rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = parent_dir(path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut temp = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(&parent)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    if let Ok(existing) = fs::metadata(path) {
        fs::set_permissions(temp.path(), existing.permissions())?;
    }

    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
