// src/lifecycle/transitions.rs

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::errors::{Result, TaskGraphError};
use crate::lifecycle::retry::{FailureDisposition, disposition};
use crate::task::Task;
use crate::types::TaskStatus;

/// Something that happens to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The executor picks the task up.
    Start,
    /// The executor reports success.
    Complete,
    /// The executor reports a failure.
    Fail,
    /// A failed task is picked up again.
    Retry,
    /// The caller found a regression and reopens the task.
    Regress,
    /// A dependency of a waiting or failed task is not completed (automatic).
    Block,
    /// All dependencies are completed (automatic).
    Unblock,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Complete => "complete",
            Event::Fail => "fail",
            Event::Retry => "retry",
            Event::Regress => "regress",
            Event::Block => "block",
            Event::Unblock => "unblock",
        }
    }
}

/// The transition table. `None` means the event is not allowed in `from`.
pub fn next_status(from: TaskStatus, event: Event) -> Option<TaskStatus> {
    use TaskStatus::*;

    match (from, event) {
        (Pending, Event::Start) => Some(InProgress),
        (Pending | Failed, Event::Block) => Some(Blocked),
        (Blocked, Event::Unblock) => Some(Pending),
        (InProgress, Event::Complete) => Some(Completed),
        (InProgress | Failed, Event::Fail) => Some(Failed),
        (Failed, Event::Retry) => Some(InProgress),
        (_, Event::Regress) => Some(Pending),
        _ => None,
    }
}

/// Look up the target status or reject the event, leaving `task` untouched.
fn target(task: &Task, event: Event) -> Result<TaskStatus> {
    next_status(task.status, event).ok_or_else(|| TaskGraphError::InvalidTransition {
        task: task.id.clone(),
        from: task.status,
        event: event.as_str(),
    })
}

/// Reject a task that still has outstanding dependencies.
///
/// Relies on `blocked_by` being current, which holds inside a `Workflow`
/// transaction.
fn ensure_unblocked(task: &Task) -> Result<()> {
    if task.blocked_by.is_empty() {
        return Ok(());
    }
    Err(TaskGraphError::DependenciesIncomplete {
        task: task.id.clone(),
        outstanding: task.blocked_by.clone(),
    })
}

/// `pending -> in_progress`. Resets the retry budget and clears the last error.
pub fn start(task: &mut Task) -> Result<()> {
    let to = target(task, Event::Start)?;
    ensure_unblocked(task)?;
    task.status = to;
    task.retry_count = 0;
    task.last_error = None;
    info!(task = %task.id, "task started");
    Ok(())
}

/// `in_progress -> completed`, stamping `completed_at`.
///
/// Whether acceptance criteria are satisfied is the caller's call; an
/// unsatisfied set only produces a warning.
pub fn complete(task: &mut Task, now: DateTime<Utc>) -> Result<()> {
    task.status = target(task, Event::Complete)?;
    task.completed_at = Some(now);

    if !task.criteria_satisfied() {
        warn!(
            task = %task.id,
            passed = task.criteria_passed(),
            total = task.acceptance_criteria.len(),
            "task completed with unpassed acceptance criteria"
        );
    }
    info!(task = %task.id, "task completed");
    Ok(())
}

/// `in_progress | failed -> failed`, recording the error and counting the
/// attempt. Never schedules a retry itself; the returned disposition tells
/// the caller what the task's error strategy says should happen next.
pub fn fail(task: &mut Task, error: impl Into<String>) -> Result<FailureDisposition> {
    task.status = target(task, Event::Fail)?;
    task.last_error = Some(error.into());
    task.retry_count = task.retry_count.saturating_add(1);

    let outcome = disposition(task);
    warn!(
        task = %task.id,
        retry_count = task.retry_count,
        max_retries = task.max_retries,
        strategy = %task.error_strategy,
        disposition = ?outcome,
        "task failed"
    );
    Ok(outcome)
}

/// `failed -> in_progress`, allowed only while the task should be retried
/// and none of its dependencies is outstanding.
pub fn retry(task: &mut Task) -> Result<()> {
    let to = target(task, Event::Retry)?;
    if !task.should_retry() {
        return Err(TaskGraphError::RetriesExhausted {
            task: task.id.clone(),
            retry_count: task.retry_count,
            max_retries: task.max_retries,
        });
    }
    ensure_unblocked(task)?;

    task.status = to;
    task.last_error = None;
    info!(task = %task.id, attempt = task.retry_count + 1, "retrying task");
    Ok(())
}

/// `any -> pending`: an explicit, caller-driven reopening.
///
/// Clears `completed_at`. Only the criteria listed in `reset_criteria` go
/// back to unpassed; all others keep their state. `reason`, if given, is kept
/// in `last_error`. The task may land in `blocked` once the caller
/// recomputes blocking state.
pub fn regress(task: &mut Task, reason: Option<String>, reset_criteria: &[usize]) -> Result<()> {
    let len = task.acceptance_criteria.len();
    if let Some(&index) = reset_criteria.iter().find(|&&i| i >= len) {
        return Err(TaskGraphError::CriterionOutOfRange {
            task: task.id.clone(),
            index,
            len,
        });
    }

    let from = task.status;
    task.status = target(task, Event::Regress)?;
    task.completed_at = None;
    for &index in reset_criteria {
        task.acceptance_criteria[index].passed = false;
    }
    if reason.is_some() {
        task.last_error = reason;
    }

    info!(
        task = %task.id,
        from = %from,
        reset = reset_criteria.len(),
        "task regressed to pending"
    );
    Ok(())
}
