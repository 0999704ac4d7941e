// src/config/model.rs

use serde::Deserialize;

use crate::task::model::DEFAULT_MAX_RETRIES;
use crate::types::ErrorStrategy;

/// Top-level configuration as read from `config.toml`.
///
/// ```toml
/// [store]
/// tasks_file = "tasks.json"
/// status_file = "status.json"
/// backup_dir = "backups"
/// max_backups = 5
///
/// [defaults]
/// max_retries = 3
/// error_strategy = "retry"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Storage layout from `[store]`.
    #[serde(default)]
    pub store: StoreSection,

    /// Defaults for new tasks from `[defaults]`.
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// `[store]` section. File names are relative to the workflow directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    /// Derived summary for dashboards; never read back.
    #[serde(default = "default_status_file")]
    pub status_file: String,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// How many backups to keep per logical file. Must be >= 1.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_tasks_file() -> String {
    "tasks.json".to_string()
}

fn default_status_file() -> String {
    "status.json".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_max_backups() -> usize {
    5
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            status_file: default_status_file(),
            backup_dir: default_backup_dir(),
            max_backups: default_max_backups(),
        }
    }
}

/// `[defaults]` section, applied to tasks added without explicit values.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// `"retry"`, `"skip"` or `"escalate"`; rejected during deserialization
    /// otherwise.
    #[serde(default)]
    pub error_strategy: ErrorStrategy,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            error_strategy: ErrorStrategy::default(),
        }
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (or `Default`), so
/// holders can rely on the invariants checked in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub store: StoreSection,
    pub defaults: DefaultsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(store: StoreSection, defaults: DefaultsSection) -> Self {
        Self { store, defaults }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(StoreSection::default(), DefaultsSection::default())
    }
}
