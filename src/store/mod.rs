// src/store/mod.rs

//! Durable, crash-consistent persistence of the task collection.
//!
//! - [`document`] is the on-disk shape of the collection.
//! - [`atomic`] implements temp-file-then-rename writes.
//! - [`backup`] rotates timestamped backups of the previous document.
//! - [`lock`] serializes read-modify-write cycles across processes.
//! - [`status`] is the derived summary written next to the document.
//!
//! Every operation reloads from disk; no collection is shared in memory
//! between operations.

pub mod atomic;
pub mod backup;
pub mod document;
pub mod lock;
pub mod status;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::StoreSection;
use crate::errors::Result;

pub use backup::BackupRotation;
pub use document::{DOCUMENT_VERSION, TaskDocument};
pub use lock::{LOCK_FILE_NAME, WorkflowLock};
pub use status::{StatusSummary, TaskSnapshot};

/// File-backed store for one workflow directory.
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
    tasks_file: String,
    tasks_path: PathBuf,
    status_path: PathBuf,
    backups: BackupRotation,
}

impl TaskStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>, layout: &StoreSection) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened task store");

        Ok(Self {
            tasks_file: layout.tasks_file.clone(),
            tasks_path: dir.join(&layout.tasks_file),
            status_path: dir.join(&layout.status_file),
            backups: BackupRotation::new(dir.join(&layout.backup_dir), layout.max_backups),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn status_path(&self) -> &Path {
        &self.status_path
    }

    /// Backups of the task document, newest first.
    pub fn backups(&self) -> Vec<PathBuf> {
        self.backups.list(&self.tasks_file)
    }

    /// Block until this process holds the workflow lock.
    pub fn lock(&self) -> Result<WorkflowLock> {
        WorkflowLock::acquire(&self.dir)
    }

    /// Read the current document.
    ///
    /// Never fails: a missing document is an empty collection, and an
    /// unreadable or corrupt one is logged and replaced by the newest backup
    /// that parses (or an empty collection if there is none).
    pub fn load(&self) -> TaskDocument {
        let bytes = match fs::read(&self.tasks_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.tasks_path.display(), "no task document yet; starting empty");
                return TaskDocument::default();
            }
            Err(e) => {
                error!(path = %self.tasks_path.display(), error = %e, "failed to read task document");
                return self.recover_from_backup();
            }
        };

        match parse_document(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                error!(path = %self.tasks_path.display(), error = %e, "task document is corrupt");
                self.recover_from_backup()
            }
        }
    }

    fn recover_from_backup(&self) -> TaskDocument {
        for path in self.backups() {
            match fs::read(&path).map_err(anyhow::Error::from).and_then(|bytes| {
                parse_document(&bytes).map_err(anyhow::Error::from)
            }) {
                Ok(doc) => {
                    warn!(backup = %path.display(), tasks = doc.tasks.len(), "recovered task document from backup");
                    return doc;
                }
                Err(e) => {
                    warn!(backup = %path.display(), error = %e, "skipping unusable backup");
                }
            }
        }

        error!("no usable backup; starting with an empty task collection");
        TaskDocument::default()
    }

    /// Persist `doc`, stamping `last_modified`.
    ///
    /// The new document is staged in a temp file and fsynced; the previous
    /// valid document is copied into the backup directory; then the temp
    /// file is renamed over the current one. A failure before the rename
    /// leaves the previous document in place.
    pub fn save(&self, doc: &mut TaskDocument) -> Result<()> {
        let now = Utc::now();
        doc.version = DOCUMENT_VERSION;
        doc.last_modified = Some(now);

        let bytes = serde_json::to_vec_pretty(doc)?;
        let temp_path = atomic::write_temp(&self.tasks_path, &bytes)?;

        self.backup_current(now);

        atomic::promote(&temp_path, &self.tasks_path)?;
        self.backups.prune(&self.tasks_file);

        debug!(path = %self.tasks_path.display(), tasks = doc.tasks.len(), "saved task document");
        Ok(())
    }

    /// Copy the current document into the backups if it is valid.
    /// Best-effort: the save goes ahead either way.
    fn backup_current(&self, now: chrono::DateTime<Utc>) {
        let current = match fs::read(&self.tasks_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(error = %e, "cannot read current document for backup");
                return;
            }
        };

        if let Err(e) = parse_document(&current) {
            warn!(error = %e, "current document is corrupt; not backing it up");
            return;
        }

        if let Err(e) = self.backups.snapshot(&self.tasks_file, &current, now) {
            warn!(error = %e, "failed to write backup");
        }
    }

    /// Write the derived status summary. Callers treat failure as non-fatal.
    pub fn write_status(&self, doc: &TaskDocument) -> Result<()> {
        let summary = StatusSummary::from_tasks(&doc.tasks, Utc::now());
        let bytes = serde_json::to_vec_pretty(&summary)?;
        atomic::write_atomic(&self.status_path, &bytes)?;
        Ok(())
    }

    /// Run `f` as a locked read-modify-write.
    ///
    /// Lock, load, refresh derived fields, apply `f`, refresh again, save,
    /// rewrite the status summary, unlock. If `f` fails nothing is written.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut TaskDocument) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut doc = self.load();
        doc.refresh();

        let value = f(&mut doc)?;

        let changes = doc.refresh();
        if !changes.is_empty() {
            info!(
                newly_blocked = ?changes.newly_blocked,
                newly_unblocked = ?changes.newly_unblocked,
                "blocking state changed"
            );
        }

        self.save(&mut doc)?;
        if let Err(e) = self.write_status(&doc) {
            warn!(path = %self.status_path.display(), error = %e, "failed to write status summary");
        }
        Ok(value)
    }

    /// Run `f` against a freshly loaded document under the lock, without
    /// saving.
    pub fn read<T>(&self, f: impl FnOnce(&TaskDocument) -> T) -> Result<T> {
        let _lock = self.lock()?;
        let mut doc = self.load();
        doc.refresh();
        Ok(f(&doc))
    }
}

/// Parse a task document from raw bytes.
pub fn parse_document(bytes: &[u8]) -> serde_json::Result<TaskDocument> {
    serde_json::from_slice(bytes)
}
