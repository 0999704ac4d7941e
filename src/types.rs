use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Failed => "failed",
        }
    }

    /// Statuses that can be held back by an incomplete dependency: anything
    /// not running and not done.
    pub fn can_block(&self) -> bool {
        !matches!(self, TaskStatus::InProgress | TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the executor reports a failure.
///
/// - `Retry`: the task may be picked up again until `max_retries` is reached.
/// - `Skip`: the failure is final; the caller may carry on with other work.
/// - `Escalate`: the failure is final and needs a human.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    #[default]
    Retry,
    Skip,
    Escalate,
}

impl FromStr for ErrorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retry" => Ok(ErrorStrategy::Retry),
            "skip" => Ok(ErrorStrategy::Skip),
            "escalate" => Ok(ErrorStrategy::Escalate),
            other => Err(format!(
                "invalid error_strategy: {other} (expected \"retry\", \"skip\" or \"escalate\")"
            )),
        }
    }
}

impl fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorStrategy::Retry => "retry",
            ErrorStrategy::Skip => "skip",
            ErrorStrategy::Escalate => "escalate",
        };
        f.write_str(s)
    }
}

/// How an acceptance criterion gets verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    /// Checked by running the `verify` command.
    Auto,
    /// Checked by a person.
    #[default]
    Manual,
}
