// src/dag/blocking.rs

//! Derived-state computation: `blocked_by`, `blocks` and the automatic
//! `pending` <-> `blocked` transitions.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::dag::graph::DependencyGraph;
use crate::task::{Task, TaskId};
use crate::types::TaskStatus;

/// What a call to [`recompute_blocking`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockingChanges {
    /// Tasks that moved `pending | failed -> blocked`.
    pub newly_blocked: Vec<TaskId>,
    /// Tasks that moved `blocked -> pending`.
    pub newly_unblocked: Vec<TaskId>,
}

impl BlockingChanges {
    pub fn is_empty(&self) -> bool {
        self.newly_blocked.is_empty() && self.newly_unblocked.is_empty()
    }
}

/// Ids of all completed tasks.
pub fn completed_ids(tasks: &[Task]) -> HashSet<&str> {
    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .map(|t| t.id.as_str())
        .collect()
}

/// Whether every dependency of `task` is in `completed`.
pub fn dependencies_met(task: &Task, completed: &HashSet<&str>) -> bool {
    task.dependencies
        .iter()
        .all(|dep| completed.contains(dep.as_str()))
}

/// Dependents of every task, derived purely from `dependencies`.
///
/// Every task has an entry, possibly empty. Dependents are in id order.
pub fn inverse_edges(tasks: &[Task]) -> BTreeMap<TaskId, Vec<TaskId>> {
    let graph = DependencyGraph::from_tasks(tasks);
    graph
        .tasks()
        .map(|id| (id.to_string(), graph.dependents_of(id).to_vec()))
        .collect()
}

/// Recompute every derived field from `dependencies` and statuses.
///
/// - `blocks` is rebuilt for every task.
/// - For tasks that are neither running nor done (`pending`, `blocked`,
///   `failed`), `blocked_by` becomes the dependencies that are not
///   completed. A non-empty set means `blocked`; an empty one turns
///   `blocked` back into `pending` and leaves `pending`/`failed` alone.
/// - `in_progress` and `completed` tasks get an empty `blocked_by`.
///
/// Must run after every mutation so that no derived field is left stale.
pub fn recompute_blocking(tasks: &mut [Task]) -> BlockingChanges {
    let completed: HashSet<TaskId> = completed_ids(tasks)
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut inverse = inverse_edges(tasks);
    let mut changes = BlockingChanges::default();

    for task in tasks.iter_mut() {
        task.blocks = inverse.remove(&task.id).unwrap_or_default();

        if !task.status.can_block() {
            task.blocked_by.clear();
            continue;
        }

        task.blocked_by = task
            .dependencies
            .iter()
            .filter(|dep| !completed.contains(dep.as_str()))
            .cloned()
            .collect();

        let next = match (task.status, task.blocked_by.is_empty()) {
            (_, false) => TaskStatus::Blocked,
            (TaskStatus::Blocked, true) => TaskStatus::Pending,
            (status, true) => status,
        };

        if next != task.status {
            match next {
                TaskStatus::Blocked => {
                    debug!(
                        task = %task.id,
                        from = %task.status,
                        blocked_by = ?task.blocked_by,
                        "task blocked"
                    );
                    changes.newly_blocked.push(task.id.clone());
                }
                _ => {
                    info!(task = %task.id, "all dependencies completed; task unblocked");
                    changes.newly_unblocked.push(task.id.clone());
                }
            }
            task.status = next;
        }
    }

    changes
}
