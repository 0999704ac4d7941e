// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, StoreSection};
use crate::errors::{Result, TaskGraphError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskGraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_store(&raw.store)?;
        Ok(ConfigFile::new_unchecked(raw.store, raw.defaults))
    }
}

fn validate_store(store: &StoreSection) -> Result<()> {
    if store.max_backups == 0 {
        return Err(TaskGraphError::ConfigError(
            "[store].max_backups must be >= 1 (got 0)".to_string(),
        ));
    }

    let names = [
        ("tasks_file", &store.tasks_file),
        ("status_file", &store.status_file),
        ("backup_dir", &store.backup_dir),
    ];

    for (key, value) in names.iter() {
        if value.trim().is_empty() {
            return Err(TaskGraphError::ConfigError(format!(
                "[store].{key} must not be empty"
            )));
        }
    }

    for (i, (key_a, a)) in names.iter().enumerate() {
        for (key_b, b) in names.iter().skip(i + 1) {
            if a == b {
                return Err(TaskGraphError::ConfigError(format!(
                    "[store].{key_a} and [store].{key_b} must differ (both '{a}')"
                )));
            }
        }
    }

    Ok(())
}
