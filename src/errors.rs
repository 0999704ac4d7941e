// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskStatus;

#[derive(Error, Debug)]
pub enum TaskGraphError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    DanglingDependency { task: String, dependency: String },

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("task '{task}' cannot {event} while {from}")]
    InvalidTransition {
        task: String,
        from: TaskStatus,
        event: &'static str,
    },

    #[error("task '{task}' has used {retry_count} of {max_retries} retries")]
    RetriesExhausted {
        task: String,
        retry_count: u32,
        max_retries: u32,
    },

    #[error("task '{task}' has no acceptance criterion #{index} (it has {len})")]
    CriterionOutOfRange {
        task: String,
        index: usize,
        len: usize,
    },

    #[error("task '{task}' is waiting on: {}", outstanding.join(", "))]
    DependenciesIncomplete {
        task: String,
        outstanding: Vec<String>,
    },

    #[error("task '{task}' is still required by: {}", dependents.join(", "))]
    HasDependents { task: String, dependents: Vec<String> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskGraphError>;
