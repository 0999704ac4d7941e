// src/scheduler/stats.rs

use serde::{Deserialize, Serialize};

use crate::lifecycle::{FailureDisposition, disposition};
use crate::task::Task;
use crate::types::TaskStatus;

/// Aggregate status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub blocked: usize,
    pub failed: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Blocked => stats.blocked += 1,
                TaskStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// Share of completed tasks, 0.0 to 100.0. An empty set is 0%.
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Why `next()` has nothing to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    /// There are no tasks at all.
    Empty,
    /// Every task is completed.
    AllComplete,
    /// Work remains, but none of it is actionable.
    Stalled {
        /// Tasks waiting on a dependency.
        blocked: usize,
        /// Failed tasks whose retry budget is used up.
        exhausted: usize,
        /// Failed tasks with the `escalate` strategy.
        escalated: usize,
        /// Failed tasks with the `skip` strategy.
        skipped: usize,
    },
}

impl IdleState {
    /// Classify a task set for which `next()` returned `None`.
    pub fn classify(tasks: &[Task]) -> Self {
        let stats = TaskStats::from_tasks(tasks);
        if stats.total == 0 {
            return IdleState::Empty;
        }
        if stats.is_complete() {
            return IdleState::AllComplete;
        }

        let (mut exhausted, mut escalated, mut skipped) = (0, 0, 0);
        for task in tasks.iter().filter(|t| t.status == TaskStatus::Failed) {
            match disposition(task) {
                FailureDisposition::Exhausted => exhausted += 1,
                FailureDisposition::Escalated => escalated += 1,
                FailureDisposition::Skipped => skipped += 1,
                FailureDisposition::WillRetry { .. } => {}
            }
        }

        IdleState::Stalled {
            blocked: stats.blocked,
            exhausted,
            escalated,
            skipped,
        }
    }
}
