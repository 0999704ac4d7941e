#![allow(dead_code)]

use std::fs;
use std::path::Path;

use taskgraph::Workflow;
use taskgraph::store::TaskDocument;
use taskgraph::task::{NewTask, Task};
use tempfile::TempDir;

pub use taskgraph_test_utils::builders::TaskBuilder;
pub use taskgraph_test_utils::init_tracing;

/// A fresh workflow in its own temp directory.
pub fn workflow() -> (TempDir, Workflow) {
    taskgraph_test_utils::temp_workflow().expect("create temp workflow")
}

/// Add a task with a title, optional priority and dependencies.
pub fn add(workflow: &Workflow, title: &str, priority: Option<i64>, deps: &[&str]) -> Task {
    let mut new_task = NewTask::new(title);
    if let Some(p) = priority {
        new_task = new_task.priority(p);
    }
    for dep in deps {
        new_task = new_task.depends_on(*dep);
    }
    workflow.add(new_task).expect("add task")
}

/// Parse the task document straight from disk, bypassing recovery.
pub fn read_document(path: &Path) -> TaskDocument {
    let bytes = fs::read(path).expect("read task document");
    serde_json::from_slice(&bytes).expect("parse task document")
}

/// Write a raw document with the given tasks to `dir/tasks.json`.
pub fn seed(dir: &Path, tasks: Vec<Task>) {
    let doc = TaskDocument {
        tasks,
        ..TaskDocument::default()
    };
    fs::create_dir_all(dir).expect("create dir");
    fs::write(
        dir.join("tasks.json"),
        serde_json::to_vec_pretty(&doc).expect("serialize"),
    )
    .expect("write seed document");
}
