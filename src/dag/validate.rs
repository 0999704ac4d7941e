// src/dag/validate.rs

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::dag::graph::DependencyGraph;
use crate::errors::{Result, TaskGraphError};
use crate::task::{Task, TaskId};

/// A structural problem found in a task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// Two records share an id.
    DuplicateId { id: TaskId },
    /// `task` lists a dependency that does not exist.
    DanglingDependency { task: TaskId, dependency: TaskId },
    /// `task` lists itself as a dependency.
    SelfDependency { task: TaskId },
    /// The listed tasks depend on each other in a loop.
    Cycle { tasks: Vec<TaskId> },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::DuplicateId { id } => write!(f, "duplicate task id '{id}'"),
            Problem::DanglingDependency { task, dependency } => {
                write!(f, "task '{task}' depends on unknown task '{dependency}'")
            }
            Problem::SelfDependency { task } => write!(f, "task '{task}' depends on itself"),
            Problem::Cycle { tasks } => {
                write!(f, "cycle detected between tasks: {}", tasks.join(", "))
            }
        }
    }
}

/// Run structural validation against a task collection.
///
/// This checks:
/// - ids are unique
/// - all dependencies refer to existing tasks
/// - no task depends on itself
/// - the dependency graph has no cycles (all of them are reported)
///
/// Problems are reported in that order and never auto-corrected.
pub fn validate(tasks: &[Task]) -> Vec<Problem> {
    let mut problems = Vec::new();
    problems.extend(duplicate_ids(tasks));
    problems.extend(dependency_references(tasks));

    let graph = DependencyGraph::from_tasks(tasks);
    problems.extend(graph.cycles().into_iter().map(|tasks| Problem::Cycle { tasks }));

    debug!(tasks = tasks.len(), problems = problems.len(), "validated task graph");
    problems
}

fn duplicate_ids(tasks: &[Task]) -> Vec<Problem> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut problems = Vec::new();

    for task in tasks {
        if !seen.insert(task.id.as_str()) && reported.insert(task.id.as_str()) {
            problems.push(Problem::DuplicateId {
                id: task.id.clone(),
            });
        }
    }
    problems
}

fn dependency_references(tasks: &[Task]) -> Vec<Problem> {
    let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut problems = Vec::new();

    for task in tasks {
        for dep in task.dependencies.iter() {
            if dep == &task.id {
                problems.push(Problem::SelfDependency {
                    task: task.id.clone(),
                });
            } else if !known.contains(dep.as_str()) {
                problems.push(Problem::DanglingDependency {
                    task: task.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    problems
}

/// Decide whether `candidate` may be admitted into `tasks`.
///
/// If a task with the same id already exists the candidate replaces it (a
/// dependency edit); otherwise it is appended (an insertion). Only problems
/// that involve the candidate reject it, so a collection that already holds
/// unrelated damage (e.g. from a hand edit) does not block new work.
pub fn check_admission(tasks: &[Task], candidate: &Task) -> Result<()> {
    let mut prospective: Vec<Task> = tasks
        .iter()
        .filter(|t| t.id != candidate.id)
        .cloned()
        .collect();
    prospective.push(candidate.clone());

    for problem in dependency_references(&prospective) {
        match problem {
            Problem::DanglingDependency { task, dependency } if task == candidate.id => {
                return Err(TaskGraphError::DanglingDependency { task, dependency });
            }
            Problem::SelfDependency { task } if task == candidate.id => {
                return Err(TaskGraphError::DagCycle(format!(
                    "task '{task}' cannot depend on itself"
                )));
            }
            _ => {}
        }
    }

    let graph = DependencyGraph::from_tasks(&prospective);
    if let Some(cycle) = graph
        .cycles()
        .into_iter()
        .find(|members| members.contains(&candidate.id))
    {
        return Err(TaskGraphError::DagCycle(format!(
            "cycle detected in task graph involving tasks: {}",
            cycle.join(", ")
        )));
    }

    Ok(())
}
