// src/workflow.rs

//! Transactional facade used by executors and other collaborators.
//!
//! Every operation is one [`TaskStore::transaction`] (or locked read):
//! reload from disk, act on a private copy, recompute derived state, save.
//! A `Workflow` value therefore holds no task state of its own and any
//! number of them, in any number of processes, can point at the same
//! directory.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{CONFIG_FILE_NAME, ConfigFile, load_for_workflow};
use crate::dag::{self, DependencyGraph, Problem, check_admission};
use crate::errors::{Result, TaskGraphError};
use crate::lifecycle::{self, FailureDisposition};
use crate::scheduler::{self, IdleState, SelectionReason, TaskStats};
use crate::store::TaskStore;
use crate::task::model::dedup_preserving_order;
use crate::task::{NewTask, Task, TaskId};
use crate::types::TaskStatus;

/// Default contents written by [`Workflow::init`].
const CONFIG_TEMPLATE: &str = r#"# taskgraph workflow configuration

[store]
tasks_file = "tasks.json"
status_file = "status.json"
backup_dir = "backups"
max_backups = 5

[defaults]
max_retries = 3
error_strategy = "retry"
"#;

/// Result of [`Workflow::complete`].
#[derive(Debug, Clone)]
pub struct Completion {
    pub task: Task,
    /// Dependents that became runnable because of this completion.
    pub unblocked: Vec<TaskId>,
}

/// Result of [`Workflow::fail`].
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub task: Task,
    pub disposition: FailureDisposition,
}

/// Handle to one workflow directory.
#[derive(Debug, Clone)]
pub struct Workflow {
    store: TaskStore,
    config: ConfigFile,
}

impl Workflow {
    /// Open the workflow in `dir`, reading `config.toml` if present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let config = load_for_workflow(dir.as_ref())?;
        Self::with_config(dir, config)
    }

    pub fn with_config(dir: impl AsRef<Path>, config: ConfigFile) -> Result<Self> {
        let store = TaskStore::open(dir, &config.store)?;
        Ok(Self { store, config })
    }

    /// Create the directory, a commented config file and an empty task
    /// document. Existing files are left alone.
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            fs::write(&config_path, CONFIG_TEMPLATE)?;
            info!(path = %config_path.display(), "wrote default config");
        }

        let workflow = Self::open(dir)?;
        if !workflow.store.tasks_path().exists() {
            workflow.store.transaction(|_| Ok(()))?;
            info!(dir = %dir.display(), "initialised empty workflow");
        }
        Ok(workflow)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Admit a new task after dependency validation.
    ///
    /// Rejects dangling references and cycles without touching the stored
    /// collection.
    pub fn add(&self, new_task: NewTask) -> Result<Task> {
        let defaults = &self.config.defaults;
        self.store.transaction(|doc| {
            let id = doc.allocate_id();
            let task = new_task.into_task(
                id.clone(),
                defaults.max_retries,
                defaults.error_strategy,
                Utc::now(),
            );

            check_admission(&doc.tasks, &task)?;
            doc.tasks.push(task);
            doc.refresh();

            info!(task = %id, "task added");
            Ok(doc.require(&id)?.clone())
        })
    }

    /// Replace the dependencies of an existing task, with the same
    /// validation as [`add`](Self::add).
    pub fn set_dependencies(&self, id: &str, dependencies: Vec<TaskId>) -> Result<Task> {
        self.store.transaction(|doc| {
            let mut candidate = doc.require(id)?.clone();
            candidate.dependencies = dedup_preserving_order(dependencies);
            check_admission(&doc.tasks, &candidate)?;

            doc.require_mut(id)?.dependencies = candidate.dependencies;
            doc.refresh();

            info!(task = %id, "dependencies updated");
            Ok(doc.require(id)?.clone())
        })
    }

    /// Delete a task. Refused while other tasks depend on it. The id is never
    /// handed out again.
    pub fn remove(&self, id: &str) -> Result<Task> {
        self.store.transaction(|doc| {
            doc.require(id)?;

            let dependents = DependencyGraph::from_tasks(&doc.tasks)
                .dependents_of(id)
                .to_vec();
            if !dependents.is_empty() {
                return Err(TaskGraphError::HasDependents {
                    task: id.to_string(),
                    dependents,
                });
            }

            let index = doc
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| TaskGraphError::TaskNotFound(id.to_string()))?;
            let removed = doc.tasks.remove(index);

            info!(task = %id, "task removed");
            Ok(removed)
        })
    }

    pub fn start(&self, id: &str) -> Result<Task> {
        self.store.transaction(|doc| {
            let others: Vec<TaskId> = doc
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::InProgress && t.id != id)
                .map(|t| t.id.clone())
                .collect();

            let task = doc.require_mut(id)?;
            lifecycle::start(task)?;

            if !others.is_empty() {
                warn!(task = %id, already_in_progress = ?others, "more than one task in progress");
            }
            Ok(task.clone())
        })
    }

    /// Mark a task completed and unblock its dependents in the same
    /// transaction.
    pub fn complete(&self, id: &str) -> Result<Completion> {
        self.store.transaction(|doc| {
            lifecycle::complete(doc.require_mut(id)?, Utc::now())?;
            let changes = doc.refresh();

            Ok(Completion {
                task: doc.require(id)?.clone(),
                unblocked: changes.newly_unblocked,
            })
        })
    }

    /// Record a failure reported by the executor.
    pub fn fail(&self, id: &str, error: impl Into<String>) -> Result<FailureReport> {
        let error = error.into();
        self.store.transaction(|doc| {
            let task = doc.require_mut(id)?;
            let disposition = lifecycle::fail(task, error)?;
            Ok(FailureReport {
                task: task.clone(),
                disposition,
            })
        })
    }

    pub fn retry(&self, id: &str) -> Result<Task> {
        self.store.transaction(|doc| {
            let task = doc.require_mut(id)?;
            lifecycle::retry(task)?;
            Ok(task.clone())
        })
    }

    /// Reopen a task after a regression, resetting only the listed criteria.
    ///
    /// Tasks that depend on it and are still waiting become blocked again.
    pub fn regress(&self, id: &str, reason: Option<String>, reset_criteria: &[usize]) -> Result<Task> {
        self.store.transaction(|doc| {
            lifecycle::regress(doc.require_mut(id)?, reason, reset_criteria)?;
            doc.refresh();
            Ok(doc.require(id)?.clone())
        })
    }

    pub fn pass_criterion(&self, id: &str, index: usize) -> Result<Task> {
        self.store.transaction(|doc| {
            let task = doc.require_mut(id)?;
            lifecycle::pass_criterion(task, index)?;
            Ok(task.clone())
        })
    }

    /// The task the executor should work on next. Side-effect free.
    pub fn next(&self) -> Result<Option<Task>> {
        Ok(self.next_with_reason()?.map(|(task, _)| task))
    }

    pub fn next_with_reason(&self) -> Result<Option<(Task, SelectionReason)>> {
        self.store.read(|doc| {
            scheduler::next(&doc.tasks).map(|s| (s.task.clone(), s.reason))
        })
    }

    /// Why [`next`](Self::next) has nothing to offer (or `None` if it does).
    pub fn idle_state(&self) -> Result<Option<IdleState>> {
        self.store.read(|doc| match scheduler::next(&doc.tasks) {
            Some(_) => None,
            None => Some(IdleState::classify(&doc.tasks)),
        })
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.store.read(|doc| doc.require(id).cloned())?
    }

    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.store.read(|doc| doc.tasks.clone())
    }

    pub fn stats(&self) -> Result<TaskStats> {
        self.store.read(|doc| TaskStats::from_tasks(&doc.tasks))
    }

    /// Structural problems in the stored collection (empty when healthy).
    pub fn validate(&self) -> Result<Vec<Problem>> {
        self.store.read(|doc| dag::validate(&doc.tasks))
    }

    /// Ids with every dependency before its dependents.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        self.store
            .read(|doc| DependencyGraph::from_tasks(&doc.tasks).topological_order())?
    }
}
