// src/store/backup.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::store::atomic::write_atomic;

/// Timestamped copies of a document, newest kept, oldest pruned.
///
/// For a logical file `tasks.json` backups are named
/// `tasks.<UTC timestamp>.json`; the timestamp format sorts lexically in
/// chronological order, so listing is a plain name sort.
#[derive(Debug, Clone)]
pub struct BackupRotation {
    dir: PathBuf,
    max_backups: usize,
}

impl BackupRotation {
    pub fn new(dir: impl Into<PathBuf>, max_backups: usize) -> Self {
        Self {
            dir: dir.into(),
            max_backups: max_backups.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Store `contents` as a new backup of `logical_name`.
    pub fn snapshot(&self, logical_name: &str, contents: &[u8], now: DateTime<Utc>) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let (stem, ext) = split_name(logical_name);
        let stamp = now.format("%Y%m%dT%H%M%S%.6fZ").to_string();

        let mut path = self.dir.join(backup_name(stem, &stamp, ext));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(backup_name(stem, &format!("{stamp}_{n:02}"), ext));
            n += 1;
        }

        write_atomic(&path, contents)?;
        debug!(path = %path.display(), "wrote backup");
        Ok(path)
    }

    /// Backups of `logical_name`, newest first.
    pub fn list(&self, logical_name: &str) -> Vec<PathBuf> {
        let (stem, ext) = split_name(logical_name);
        let prefix = format!("{stem}.");
        let suffix = ext.map(|e| format!(".{e}")).unwrap_or_default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(dir = %self.dir.display(), error = %e, "cannot list backups");
                }
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                name.starts_with(&prefix)
                    && name.ends_with(&suffix)
                    && name.len() > prefix.len() + suffix.len()
                    && !name.ends_with(super::atomic::TEMP_SUFFIX)
            })
            .collect();

        names.sort();
        names.reverse();
        names.into_iter().map(|name| self.dir.join(name)).collect()
    }

    /// Delete all but the newest `max_backups` backups of `logical_name`.
    ///
    /// Best-effort: failures are logged and never returned. Returns how many
    /// files were removed.
    pub fn prune(&self, logical_name: &str) -> usize {
        let mut removed = 0;
        for path in self.list(logical_name).into_iter().skip(self.max_backups) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to prune backup"),
            }
        }

        if removed > 0 {
            info!(removed, keep = self.max_backups, "pruned old backups");
        }
        removed
    }
}

/// `tasks.json` -> (`tasks`, Some(`json`)); `tasks` -> (`tasks`, None).
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

fn backup_name(stem: &str, stamp: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{stamp}.{ext}"),
        None => format!("{stem}.{stamp}"),
    }
}
