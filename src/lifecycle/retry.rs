// src/lifecycle/retry.rs

use crate::task::Task;
use crate::types::ErrorStrategy;

/// What the error strategy says about a task that just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// `retry` strategy with budget left; `next()` will offer the task again.
    WillRetry { remaining: u32 },
    /// `retry` strategy, budget used up.
    Exhausted,
    /// `skip` strategy; the failure is final.
    Skipped,
    /// `escalate` strategy; the failure is final and needs attention.
    Escalated,
}

impl FailureDisposition {
    /// `true` if the task will not be offered again without intervention.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FailureDisposition::WillRetry { .. })
    }
}

/// Strategy dispatch for a failed task.
pub fn disposition(task: &Task) -> FailureDisposition {
    match task.error_strategy {
        ErrorStrategy::Retry if task.retry_count < task.max_retries => {
            FailureDisposition::WillRetry {
                remaining: task.max_retries - task.retry_count,
            }
        }
        ErrorStrategy::Retry => FailureDisposition::Exhausted,
        ErrorStrategy::Skip => FailureDisposition::Skipped,
        ErrorStrategy::Escalate => FailureDisposition::Escalated,
    }
}

impl Task {
    /// `true` if a failed task may be picked up again: the strategy is
    /// `retry` and the budget is not used up.
    pub fn should_retry(&self) -> bool {
        matches!(disposition(self), FailureDisposition::WillRetry { .. })
    }
}
