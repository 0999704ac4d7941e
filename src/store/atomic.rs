// src/store/atomic.rs

//! Temp-file-then-rename writes.
//!
//! A crash at any point leaves either the old file or the complete new file
//! at the target path, never a partial one. Stray temp files are ignored by
//! readers and overwritten by the next write.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Suffix appended to the target file name for the staging file.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Staging path for `path`: same directory, `<name>.tmp`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Write `data` to the staging file for `path` and fsync it.
///
/// Returns the staging path; nothing is visible at `path` yet.
pub fn write_temp(path: &Path, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let result = (|| {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(data)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    })();

    if let Err(e) = result {
        discard(&temp_path);
        return Err(e);
    }
    Ok(temp_path)
}

/// Atomically move a staged file over `path`.
pub fn promote(temp_path: &Path, path: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(temp_path, path) {
        discard(temp_path);
        return Err(e);
    }
    sync_parent(path);
    debug!(path = %path.display(), "atomic write completed");
    Ok(())
}

/// Stage and promote in one step.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = write_temp(path, data)?;
    promote(&temp_path, path)
}

/// Remove a staging file, logging rather than failing.
pub fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }
    }
}

/// Persist the rename itself. Best-effort: directory handles are not
/// syncable everywhere.
#[cfg(unix)]
fn sync_parent(path: &Path) {
    if let Some(dir) = path.parent().and_then(|p| File::open(p).ok()) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) {}
