// src/scheduler/select.rs

use tracing::debug;

use crate::dag::{completed_ids, dependencies_met};
use crate::task::{Task, id_sort_key};
use crate::types::TaskStatus;

/// Why a task was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Already `in_progress`; the executor should carry on with it.
    Resume,
    /// `failed` with retry budget left.
    Retry,
    /// `pending` with every dependency completed.
    Ready,
}

/// The task the executor should work on next, and why.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub task: &'a Task,
    pub reason: SelectionReason,
}

/// Pick the next actionable task, in strict order:
///
/// 1. an `in_progress` task;
/// 2. a `failed` task that should be retried and whose dependencies are all
///    completed;
/// 3. a `pending` task whose dependencies are all completed.
///
/// Within each tier the lowest priority value wins, ties broken by id order.
/// Returns `None` when nothing is actionable; see [`super::IdleState`] for
/// telling the reasons apart. Never mutates anything.
pub fn next(tasks: &[Task]) -> Option<Selection<'_>> {
    let completed = completed_ids(tasks);
    let selection = best(tasks.iter().filter(|t| t.status == TaskStatus::InProgress))
        .map(|task| Selection {
            task,
            reason: SelectionReason::Resume,
        })
        .or_else(|| {
            best(
                tasks
                    .iter()
                    .filter(|t| {
                        t.status == TaskStatus::Failed
                            && t.should_retry()
                            && dependencies_met(t, &completed)
                    }),
            )
            .map(|task| Selection {
                task,
                reason: SelectionReason::Retry,
            })
        })
        .or_else(|| {
            best(
                tasks
                    .iter()
                    .filter(|t| t.status == TaskStatus::Pending && dependencies_met(t, &completed)),
            )
            .map(|task| Selection {
                task,
                reason: SelectionReason::Ready,
            })
        });

    match &selection {
        Some(s) => debug!(task = %s.task.id, reason = ?s.reason, "selected next task"),
        None => debug!("no actionable task"),
    }
    selection
}

/// Lowest `(priority, id)` among `candidates`.
fn best<'a>(candidates: impl Iterator<Item = &'a Task>) -> Option<&'a Task> {
    candidates.min_by(|a, b| {
        a.priority_key()
            .cmp(&b.priority_key())
            .then_with(|| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)))
    })
}
