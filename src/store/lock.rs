// src/store/lock.rs

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::errors::Result;

/// Name of the lock file inside a workflow directory.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Exclusive advisory lock over a workflow directory.
///
/// Held for the whole read-modify-write of a transaction and released when
/// the guard is dropped, including on `?` early returns and panics.
/// Acquisition blocks without a timeout; callers needing a bounded wait can
/// poll [`WorkflowLock::try_acquire`].
#[derive(Debug)]
pub struct WorkflowLock {
    file: File,
    path: PathBuf,
}

impl WorkflowLock {
    /// Block until the lock on `dir` is ours.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let (file, path) = open_lock_file(dir)?;
        file.lock_exclusive()?;
        debug!(path = %path.display(), "acquired workflow lock");
        Ok(Self { file, path })
    }

    /// Take the lock if it is free; `Ok(None)` if another holder has it.
    pub fn try_acquire(dir: &Path) -> Result<Option<Self>> {
        let (file, path) = open_lock_file(dir)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired workflow lock");
                Ok(Some(Self { file, path }))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkflowLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!(path = %self.path.display(), "released workflow lock"),
            // Closing the handle releases the lock anyway.
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to unlock workflow lock"),
        }
    }
}

fn open_lock_file(dir: &Path) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOCK_FILE_NAME);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;
    Ok((file, path))
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
