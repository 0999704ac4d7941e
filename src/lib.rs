// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod task;
pub mod types;
pub mod workflow;

use anyhow::Result;
use tracing::debug;

use crate::cli::{AddArgs, CliArgs, Command, ListOrder};
use crate::config::default_workflow_dir;
use crate::lifecycle::FailureDisposition;
use crate::scheduler::IdleState;
use crate::task::{AcceptanceCriterion, NewTask, Task};

pub use crate::workflow::{Completion, FailureReport, Workflow};

/// High-level entry point used by `main.rs`.
///
/// Resolves the workflow directory, opens it and dispatches one command.
pub fn run(args: CliArgs) -> Result<()> {
    let dir = args.dir.clone().unwrap_or_else(default_workflow_dir);
    debug!(dir = %dir.display(), command = ?args.command, "dispatching");

    let workflow = match args.command {
        Command::Init => Workflow::init(&dir)?,
        _ => Workflow::open(&dir)?,
    };

    match args.command {
        Command::Init => {
            println!("initialised workflow in {}", workflow.store().dir().display());
        }
        Command::Add(add) => {
            let task = workflow.add(new_task_from_args(add))?;
            println!("added {}", task.id);
        }
        Command::Next => match workflow.next_with_reason()? {
            Some((task, reason)) => {
                println!("{} ({:?})", task.id, reason);
                print_task(&task);
            }
            None => match workflow.idle_state()? {
                Some(state) => print_idle(&state),
                None => println!("nothing to do"),
            },
        },
        Command::Start { id } => {
            let task = workflow.start(&id)?;
            println!("{} is {}", task.id, task.status);
        }
        Command::Complete { id } => {
            let done = workflow.complete(&id)?;
            println!("{} is {}", done.task.id, done.task.status);
            if !done.unblocked.is_empty() {
                println!("unblocked: {}", done.unblocked.join(", "));
            }
        }
        Command::Fail { id, message } => {
            let report = workflow.fail(&id, message)?;
            println!("{} failed: {}", report.task.id, describe_disposition(&report.disposition));
        }
        Command::Retry { id } => {
            let task = workflow.retry(&id)?;
            println!(
                "{} is {} (retry {} of {})",
                task.id, task.status, task.retry_count, task.max_retries
            );
        }
        Command::Regress {
            id,
            reason,
            reset_criteria,
        } => {
            let task = workflow.regress(&id, reason, &reset_criteria)?;
            println!("{} is {}", task.id, task.status);
        }
        Command::Pass { id, index } => {
            let task = workflow.pass_criterion(&id, index)?;
            println!(
                "{}: {}/{} criteria passed",
                task.id,
                task.criteria_passed(),
                task.acceptance_criteria.len()
            );
        }
        Command::Deps { id, on } => {
            let task = workflow.set_dependencies(&id, on)?;
            println!("{} depends on [{}]", task.id, task.dependencies.join(", "));
        }
        Command::Remove { id } => {
            let task = workflow.remove(&id)?;
            println!("removed {}", task.id);
        }
        Command::Show { id } => print_task(&workflow.get(&id)?),
        Command::List { order } => {
            let tasks = workflow.tasks()?;
            let ids = match order {
                ListOrder::Id => tasks.iter().map(|t| t.id.clone()).collect(),
                ListOrder::Topo => workflow.topological_order()?,
            };
            for id in ids {
                if let Some(task) = tasks.iter().find(|t| t.id == id) {
                    print_summary_line(task);
                }
            }
        }
        Command::Status => {
            let stats = workflow.stats()?;
            println!(
                "{}/{} completed ({:.1}%)",
                stats.completed,
                stats.total,
                stats.progress_percent()
            );
            println!("  in_progress: {}", stats.in_progress);
            println!("  pending:     {}", stats.pending);
            println!("  blocked:     {}", stats.blocked);
            println!("  failed:      {}", stats.failed);
        }
        Command::Validate => {
            let problems = workflow.validate()?;
            if problems.is_empty() {
                println!("ok");
            } else {
                for problem in &problems {
                    println!("{problem}");
                }
                anyhow::bail!("{} problem(s) found", problems.len());
            }
        }
    }

    Ok(())
}

fn new_task_from_args(args: AddArgs) -> NewTask {
    let mut new_task = NewTask::new(args.title);
    if let Some(description) = args.description {
        new_task = new_task.description(description);
    }
    if let Some(priority) = args.priority {
        new_task = new_task.priority(priority);
    }
    if let Some(max_retries) = args.max_retries {
        new_task = new_task.max_retries(max_retries);
    }
    if let Some(strategy) = args.strategy {
        new_task = new_task.error_strategy(strategy);
    }
    for step in args.steps {
        new_task = new_task.step(step);
    }
    for dep in args.depends_on {
        new_task = new_task.depends_on(dep);
    }
    for raw in args.criteria {
        new_task = new_task.criterion(parse_auto_criterion(&raw));
    }
    for text in args.manual_criteria {
        new_task = new_task.criterion(AcceptanceCriterion::manual(text));
    }
    new_task
}

/// `TEXT::COMMAND` becomes an auto criterion with a verify command.
fn parse_auto_criterion(raw: &str) -> AcceptanceCriterion {
    match raw.split_once("::") {
        Some((text, cmd)) if !cmd.trim().is_empty() => {
            AcceptanceCriterion::auto(text.trim(), Some(cmd.trim().to_string()))
        }
        _ => AcceptanceCriterion::auto(raw.trim(), None),
    }
}

fn describe_disposition(disposition: &FailureDisposition) -> String {
    match disposition {
        FailureDisposition::WillRetry { remaining } => {
            format!("will retry ({remaining} left)")
        }
        FailureDisposition::Exhausted => "retries exhausted".to_string(),
        FailureDisposition::Skipped => "skipped".to_string(),
        FailureDisposition::Escalated => "escalated for human review".to_string(),
    }
}

fn print_idle(state: &IdleState) {
    match state {
        IdleState::Empty => println!("no tasks"),
        IdleState::AllComplete => println!("all tasks completed"),
        IdleState::Stalled {
            blocked,
            exhausted,
            escalated,
            skipped,
        } => {
            println!("stalled: no actionable task");
            println!("  blocked:   {blocked}");
            println!("  exhausted: {exhausted}");
            println!("  escalated: {escalated}");
            println!("  skipped:   {skipped}");
        }
    }
}

fn print_summary_line(task: &Task) {
    let priority = task
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<10} {:<12} p={:<4} {}",
        task.id,
        task.status.as_str(),
        priority,
        task.title
    );
}

fn print_task(task: &Task) {
    println!("{}: {}", task.id, task.title);
    println!("  status: {}", task.status);
    if let Some(priority) = task.priority {
        println!("  priority: {priority}");
    }
    if !task.description.is_empty() {
        println!("  description: {}", task.description);
    }
    for (i, step) in task.steps.iter().enumerate() {
        println!("  step {}: {step}", i + 1);
    }
    if !task.dependencies.is_empty() {
        println!("  dependencies: [{}]", task.dependencies.join(", "));
    }
    if !task.blocked_by.is_empty() {
        println!("  blocked_by: [{}]", task.blocked_by.join(", "));
    }
    if !task.blocks.is_empty() {
        println!("  blocks: [{}]", task.blocks.join(", "));
    }
    println!(
        "  retries: {}/{} ({})",
        task.retry_count, task.max_retries, task.error_strategy
    );
    if let Some(ref err) = task.last_error {
        println!("  last_error: {err}");
    }
    for (i, c) in task.acceptance_criteria.iter().enumerate() {
        let mark = if c.passed { "x" } else { " " };
        println!("  [{mark}] #{i} {} ({:?})", c.criterion, c.kind);
        if let Some(ref verify) = c.verify {
            println!("        verify: {verify}");
        }
    }
    if let Some(at) = task.completed_at {
        println!("  completed_at: {}", at.to_rfc3339());
    }
}
