use taskgraph::task::{AcceptanceCriterion, Task, format_id};
use taskgraph::types::{ErrorStrategy, TaskStatus};

/// Builder for raw [`Task`] records, for tests that work below the
/// `Workflow` layer (scheduler, graph, lifecycle) or that seed documents
/// directly.
///
/// Derived fields (`blocked_by`, `blocks`) are left empty; run
/// `recompute_blocking` if the test needs them.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// A pending task with id `task-NNN` and a matching title.
    pub fn new(n: u64) -> Self {
        let id = format_id(n);
        Self {
            task: Task {
                title: format!("Task {n}"),
                id,
                description: String::new(),
                priority: None,
                status: TaskStatus::Pending,
                steps: vec![],
                dependencies: vec![],
                blocked_by: vec![],
                blocks: vec![],
                retry_count: 0,
                max_retries: 3,
                error_strategy: ErrorStrategy::Retry,
                last_error: None,
                acceptance_criteria: vec![],
                completed_at: None,
                created_at: None,
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.task.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn after(mut self, dep: u64) -> Self {
        self.task.dependencies.push(format_id(dep));
        self
    }

    pub fn after_id(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn retries(mut self, retry_count: u32, max_retries: u32) -> Self {
        self.task.retry_count = retry_count;
        self.task.max_retries = max_retries;
        self
    }

    pub fn strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.task.error_strategy = strategy;
        self
    }

    pub fn criterion(mut self, text: &str) -> Self {
        self.task
            .acceptance_criteria
            .push(AcceptanceCriterion::manual(text));
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}
