// src/store/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dag::{BlockingChanges, recompute_blocking};
use crate::errors::{Result, TaskGraphError};
use crate::task::id::{format_id, next_id_number};
use crate::task::{Task, TaskId};

/// Schema version written by this crate.
pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// The persisted task collection: one JSON document per workflow directory.
///
/// A bare `{"tasks": [...]}` is a valid document; every other field has a
/// default, and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Highest id number ever issued, so ids of removed tasks are not reused.
    #[serde(default)]
    pub last_id: u64,

    /// Stamped by every successful save.
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for TaskDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            last_id: 0,
            last_modified: None,
            tasks: Vec::new(),
        }
    }
}

impl TaskDocument {
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Like [`find`](Self::find) but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<&Task> {
        self.find(id)
            .ok_or_else(|| TaskGraphError::TaskNotFound(id.to_string()))
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.find_mut(id)
            .ok_or_else(|| TaskGraphError::TaskNotFound(id.to_string()))
    }

    /// Reserve the next id in the `task-NNN` sequence.
    pub fn allocate_id(&mut self) -> TaskId {
        let n = next_id_number(self.last_id, self.tasks.iter().map(|t| t.id.as_str()));
        self.last_id = n;
        format_id(n)
    }

    /// Recompute derived fields (`blocked_by`, `blocks`, blocked/pending).
    pub fn refresh(&mut self) -> BlockingChanges {
        recompute_blocking(&mut self.tasks)
    }
}
