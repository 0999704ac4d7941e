// src/task/model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;
use crate::types::{CriterionKind, ErrorStrategy, TaskStatus};

/// Retry budget used when neither the request nor the config sets one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// A persisted work item.
///
/// Every field except `id` is optional on disk so that documents written by
/// older versions still load; unknown fields are ignored.
///
/// `blocked_by` and `blocks` are projections of `dependencies` plus the
/// statuses of other tasks. They are serialized for external readers but
/// recomputed by [`crate::dag::recompute_blocking`] after every load and every
/// mutation, never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Lower value = higher precedence. `None` sorts after everything.
    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Free-text steps; documentation only.
    #[serde(default)]
    pub steps: Vec<String>,

    /// Ids that must be `completed` before this task may run.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,

    /// Derived: dependencies not yet completed (waiting tasks only).
    #[serde(default)]
    pub blocked_by: Vec<TaskId>,

    /// Derived: tasks listing this one as a dependency.
    #[serde(default)]
    pub blocks: Vec<TaskId>,

    #[serde(default)]
    pub retry_count: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub error_strategy: ErrorStrategy,

    #[serde(default)]
    pub last_error: Option<String>,

    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Priority as a sortable key; unset priorities come after every set
    /// value, `i64::MAX` included.
    pub fn priority_key(&self) -> (bool, Option<i64>) {
        (self.priority.is_none(), self.priority)
    }

    /// `true` if the task has no acceptance criteria or all of them passed.
    ///
    /// Informational only: it never drives a status transition.
    pub fn criteria_satisfied(&self) -> bool {
        self.acceptance_criteria.iter().all(|c| c.passed)
    }

    /// Number of passed criteria, for progress displays.
    pub fn criteria_passed(&self) -> usize {
        self.acceptance_criteria.iter().filter(|c| c.passed).count()
    }
}

/// One acceptance criterion attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub criterion: String,

    #[serde(rename = "type", default)]
    pub kind: CriterionKind,

    /// Shell command that checks an `auto` criterion.
    #[serde(default)]
    pub verify: Option<String>,

    #[serde(default)]
    pub passed: bool,
}

impl AcceptanceCriterion {
    pub fn manual(criterion: impl Into<String>) -> Self {
        Self {
            criterion: criterion.into(),
            kind: CriterionKind::Manual,
            verify: None,
            passed: false,
        }
    }

    pub fn auto(criterion: impl Into<String>, verify: Option<String>) -> Self {
        Self {
            criterion: criterion.into(),
            kind: CriterionKind::Auto,
            verify,
            passed: false,
        }
    }
}

/// Request to create a task.
///
/// The id, status, derived fields and retry bookkeeping are not part of the
/// request; `Workflow::add` assigns them after validation.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Option<i64>,
    pub steps: Vec<String>,
    pub dependencies: Vec<TaskId>,
    /// Falls back to `[defaults].max_retries` when `None`.
    pub max_retries: Option<u32>,
    /// Falls back to `[defaults].error_strategy` when `None`.
    pub error_strategy: Option<ErrorStrategy>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn depends_on(mut self, id: impl Into<TaskId>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.error_strategy = Some(strategy);
        self
    }

    pub fn criterion(mut self, criterion: AcceptanceCriterion) -> Self {
        self.acceptance_criteria.push(criterion);
        self
    }

    /// Materialize the request as a `pending` task with the given id.
    ///
    /// Duplicate dependencies collapse to their first occurrence.
    pub fn into_task(
        self,
        id: TaskId,
        default_max_retries: u32,
        default_strategy: ErrorStrategy,
        now: DateTime<Utc>,
    ) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: TaskStatus::Pending,
            steps: self.steps,
            dependencies: dedup_preserving_order(self.dependencies),
            blocked_by: Vec::new(),
            blocks: Vec::new(),
            retry_count: 0,
            max_retries: self.max_retries.unwrap_or(default_max_retries),
            error_strategy: self.error_strategy.unwrap_or(default_strategy),
            last_error: None,
            acceptance_criteria: self.acceptance_criteria,
            completed_at: None,
            created_at: Some(now),
        }
    }
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn dedup_preserving_order(ids: Vec<TaskId>) -> Vec<TaskId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
