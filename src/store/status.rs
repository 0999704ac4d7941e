// src/store/status.rs

//! Derived status summary for dashboards.
//!
//! Rewritten after every mutating operation so that pollers can read counts
//! and the current/next task without parsing the whole task list. The core
//! never reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::{self, TaskStats};
use crate::task::Task;
use crate::types::TaskStatus;

/// Minimal view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
        }
    }
}

/// Contents of the status summary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub stats: TaskStats,
    pub progress_percent: f64,
    pub last_update: DateTime<Utc>,
    /// The task being worked on, if any.
    pub current_task: Option<TaskSnapshot>,
    /// What `next()` returns right now.
    pub next_task: Option<TaskSnapshot>,
}

impl StatusSummary {
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let stats = TaskStats::from_tasks(tasks);
        let next = scheduler::next(tasks);
        let current_task = next
            .filter(|s| s.task.status == TaskStatus::InProgress)
            .map(|s| TaskSnapshot::from(s.task));

        Self {
            stats,
            progress_percent: stats.progress_percent(),
            last_update: now,
            current_task,
            next_task: next.map(|s| TaskSnapshot::from(s.task)),
        }
    }
}
