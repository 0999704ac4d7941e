mod common;

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use taskgraph::Workflow;
use taskgraph::store::WorkflowLock;
use taskgraph::task::NewTask;

use common::{add, workflow};

#[test]
fn test_concurrent_adds_get_unique_ids_and_none_are_lost() {
    let (dir, _wf) = workflow();
    let threads = 8;
    let per_thread = 5;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let path = dir.path().to_path_buf();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Each thread has its own handle, like separate processes would.
                let wf = Workflow::open(&path).unwrap();
                barrier.wait();
                (0..per_thread)
                    .map(|i| wf.add(NewTask::new(format!("t{t}-{i}"))).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id handed out");
        }
    }

    let stored = Workflow::open(dir.path()).unwrap().tasks().unwrap();
    assert_eq!(stored.len(), threads * per_thread);
    assert_eq!(ids.len(), threads * per_thread);
}

#[test]
fn test_concurrent_lifecycle_updates_do_not_clobber_each_other() {
    let (dir, wf) = workflow();
    let ids: Vec<String> = (0..6).map(|i| add(&wf, &format!("job {i}"), None, &[]).id).collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let path = dir.path().to_path_buf();
            thread::spawn(move || {
                let wf = Workflow::open(&path).unwrap();
                wf.start(&id).unwrap();
                wf.complete(&id).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = wf.stats().unwrap();
    assert_eq!(stats.completed, ids.len());
    assert!(stats.is_complete());
}

#[test]
fn test_operations_wait_for_the_lock() {
    let (dir, wf) = workflow();
    add(&wf, "before", None, &[]);

    let guard = WorkflowLock::acquire(dir.path()).unwrap();
    assert!(WorkflowLock::try_acquire(dir.path()).unwrap().is_none());

    let path = dir.path().to_path_buf();
    let writer = thread::spawn(move || {
        let wf = Workflow::open(&path).unwrap();
        wf.add(NewTask::new("after")).unwrap().id
    });

    thread::sleep(Duration::from_millis(100));
    assert!(!writer.is_finished());

    drop(guard);
    assert_eq!(writer.join().unwrap(), "task-002");
    assert_eq!(wf.tasks().unwrap().len(), 2);
}
