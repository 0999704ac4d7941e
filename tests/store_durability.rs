mod common;

use std::fs;

use taskgraph::config::StoreSection;
use taskgraph::store::{TaskDocument, TaskStore, atomic, parse_document};
use taskgraph::task::NewTask;
use taskgraph::types::TaskStatus;
use tempfile::tempdir;

use common::{TaskBuilder, add, init_tracing, read_document, seed, workflow};

fn store_in(dir: &std::path::Path, max_backups: usize) -> TaskStore {
    let layout = StoreSection {
        max_backups,
        ..StoreSection::default()
    };
    TaskStore::open(dir, &layout).unwrap()
}

#[test]
fn test_missing_document_loads_empty() {
    init_tracing();
    let dir = tempdir().unwrap();
    let store = store_in(dir.path(), 5);

    let doc = store.load();
    assert!(doc.tasks.is_empty());
    assert_eq!(doc.last_id, 0);
}

#[test]
fn test_round_trip_preserves_task_fields() {
    let (_dir, wf) = workflow();
    let a = add(&wf, "A", Some(1), &[]);
    wf.add(
        NewTask::new("B")
            .description("second")
            .step("do it")
            .depends_on(a.id.clone())
            .criterion(taskgraph::task::AcceptanceCriterion::auto(
                "tests pass",
                Some("cargo test".to_string()),
            )),
    )
    .unwrap();

    let store = wf.store();
    let mut doc = store.load();
    let before = doc.tasks.clone();

    store.save(&mut doc).unwrap();
    let after = store.load().tasks;

    assert_eq!(before, after);
}

#[test]
fn test_interrupted_write_leaves_previous_document() {
    let (_dir, wf) = workflow();
    add(&wf, "survivor", None, &[]);
    let store = wf.store();

    // Staged but never renamed: what a crash between the two steps leaves.
    let mut doomed = store.load();
    doomed.tasks.clear();
    let staged = atomic::write_temp(store.tasks_path(), &serde_json::to_vec(&doomed).unwrap()).unwrap();
    assert!(staged.exists());

    let doc = store.load();
    assert_eq!(doc.tasks.len(), 1);
    assert_eq!(doc.tasks[0].title, "survivor");

    // The next real save overwrites the stray staging file.
    add(&wf, "after crash", None, &[]);
    assert!(!staged.exists());
    assert_eq!(wf.tasks().unwrap().len(), 2);
}

#[test]
fn test_corrupt_document_recovers_newest_valid_backup() {
    let (_dir, wf) = workflow();
    add(&wf, "one", None, &[]);
    add(&wf, "two", None, &[]);
    add(&wf, "three", None, &[]);

    let store = wf.store();
    fs::write(store.tasks_path(), b"{ this is not json").unwrap();

    // The newest backup holds the document as it was before the third add.
    let doc = store.load();
    let titles: Vec<_> = doc.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["one", "two"]);
}

#[test]
fn test_corrupt_document_without_backups_loads_empty() {
    init_tracing();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tasks.json"), b"[1, 2,").unwrap();

    let store = store_in(dir.path(), 5);
    assert_eq!(store.load(), TaskDocument::default());
}

#[test]
fn test_corrupt_backups_are_skipped() {
    let (_dir, wf) = workflow();
    add(&wf, "one", None, &[]);
    add(&wf, "two", None, &[]);
    add(&wf, "three", None, &[]);

    let store = wf.store();
    let backups = store.backups();
    assert_eq!(backups.len(), 2);
    fs::write(&backups[0], b"garbage").unwrap();
    fs::write(store.tasks_path(), b"garbage").unwrap();

    let doc = store.load();
    assert_eq!(doc.tasks.len(), 1);
    assert_eq!(doc.tasks[0].title, "one");
}

#[test]
fn test_corrupt_current_document_is_not_backed_up() {
    let (_dir, wf) = workflow();
    add(&wf, "one", None, &[]);
    let store = wf.store();
    let backups_before = store.backups().len();

    fs::write(store.tasks_path(), b"garbage").unwrap();
    let mut doc = store.load();
    store.save(&mut doc).unwrap();

    assert_eq!(store.backups().len(), backups_before);
    for backup in store.backups() {
        assert!(parse_document(&fs::read(backup).unwrap()).is_ok());
    }
}

#[test]
fn test_backups_are_pruned_to_limit() {
    init_tracing();
    let dir = tempdir().unwrap();
    let store = store_in(dir.path(), 3);

    let mut doc = TaskDocument::default();
    for n in 1..=8 {
        doc.tasks.push(TaskBuilder::new(n).build());
        store.save(&mut doc).unwrap();
    }

    let backups = store.backups();
    assert_eq!(backups.len(), 3);

    // Newest first: the previous three states.
    let sizes: Vec<usize> = backups
        .iter()
        .map(|p| read_document(p).tasks.len())
        .collect();
    assert_eq!(sizes, vec![7, 6, 5]);
}

#[test]
fn test_save_stamps_last_modified_and_writes_status() {
    let (_dir, wf) = workflow();
    let a = add(&wf, "A", Some(1), &[]);
    add(&wf, "B", Some(2), &[&a.id]);

    let doc = read_document(wf.store().tasks_path());
    assert!(doc.last_modified.is_some());
    assert_eq!(doc.last_id, 2);

    let status: serde_json::Value =
        serde_json::from_slice(&fs::read(wf.store().status_path()).unwrap()).unwrap();
    assert_eq!(status["stats"]["total"], 2);
    assert_eq!(status["stats"]["blocked"], 1);
    assert_eq!(status["next_task"]["id"], "task-001");
    assert!(status["current_task"].is_null());

    wf.start(&a.id).unwrap();
    let status: serde_json::Value =
        serde_json::from_slice(&fs::read(wf.store().status_path()).unwrap()).unwrap();
    assert_eq!(status["current_task"]["id"], "task-001");
    assert_eq!(status["current_task"]["status"], "in_progress");
}

#[test]
fn test_minimal_document_with_unknown_fields_loads() {
    init_tracing();
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("tasks.json"),
        br#"{
            "project": "legacy",
            "tasks": [
                {"id": "task-001", "title": "old", "status": "completed", "owner": "someone"},
                {"id": "task-002", "dependencies": ["task-001"], "acceptance_criteria": [
                    {"criterion": "works", "type": "auto", "verify": "make check"}
                ]}
            ]
        }"#,
    )
    .unwrap();

    let store = store_in(dir.path(), 5);
    let mut doc = store.load();
    assert_eq!(doc.tasks.len(), 2);
    assert_eq!(doc.tasks[1].max_retries, 3);
    assert_eq!(doc.tasks[1].status, TaskStatus::Pending);
    assert!(!doc.tasks[1].acceptance_criteria[0].passed);

    // Ids continue after the highest one present.
    assert_eq!(doc.allocate_id(), "task-003");
}

#[test]
fn test_removed_ids_are_never_reused() {
    let (_dir, wf) = workflow();
    add(&wf, "one", None, &[]);
    let two = add(&wf, "two", None, &[]);

    wf.remove(&two.id).unwrap();
    let three = add(&wf, "three", None, &[]);
    assert_eq!(three.id, "task-003");
}

#[test]
fn test_failed_operation_leaves_document_untouched() {
    init_tracing();
    let dir = tempdir().unwrap();
    seed(dir.path(), vec![TaskBuilder::new(1).build()]);

    let wf = taskgraph::Workflow::open(dir.path()).unwrap();
    let before = fs::read(wf.store().tasks_path()).unwrap();

    assert!(wf.complete("task-001").is_err());
    assert!(wf.start("task-404").is_err());

    assert_eq!(fs::read(wf.store().tasks_path()).unwrap(), before);
    assert!(wf.store().backups().is_empty());
}
