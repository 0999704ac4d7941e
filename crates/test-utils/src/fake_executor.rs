use std::collections::{HashMap, VecDeque};

use taskgraph::Workflow;
use taskgraph::errors::Result;
use taskgraph::lifecycle::FailureDisposition;
use taskgraph::scheduler::SelectionReason;

/// What the fake executor does with one attempt of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail(String),
}

/// One step the executor took, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub task: String,
    pub reason: SelectionReason,
    pub outcome: Outcome,
    pub disposition: Option<FailureDisposition>,
}

/// A fake executor that:
/// - asks the workflow for `next()`
/// - starts (or retries) the task
/// - reports the scripted outcome for that attempt, succeeding once the
///   script for a task runs out
///
/// It stops when `next()` has nothing left or after `max_steps` attempts.
pub struct ScriptedExecutor {
    scripts: HashMap<String, VecDeque<Outcome>>,
    attempts: Vec<Attempt>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            attempts: Vec::new(),
        }
    }

    /// Queue outcomes for successive attempts of `task`.
    pub fn script(mut self, task: &str, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.scripts
            .entry(task.to_string())
            .or_default()
            .extend(outcomes);
        self
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Ids in the order they were attempted.
    pub fn executed(&self) -> Vec<String> {
        self.attempts.iter().map(|a| a.task.clone()).collect()
    }

    pub fn run(&mut self, workflow: &Workflow, max_steps: usize) -> Result<()> {
        for _ in 0..max_steps {
            let Some((task, reason)) = workflow.next_with_reason()? else {
                return Ok(());
            };

            match reason {
                SelectionReason::Ready => {
                    workflow.start(&task.id)?;
                }
                SelectionReason::Retry => {
                    workflow.retry(&task.id)?;
                }
                SelectionReason::Resume => {}
            }

            let outcome = self
                .scripts
                .get_mut(&task.id)
                .and_then(|q| q.pop_front())
                .unwrap_or(Outcome::Succeed);

            let disposition = match &outcome {
                Outcome::Succeed => {
                    workflow.complete(&task.id)?;
                    None
                }
                Outcome::Fail(msg) => Some(workflow.fail(&task.id, msg.clone())?.disposition),
            };

            self.attempts.push(Attempt {
                task: task.id,
                reason,
                outcome,
                disposition,
            });
        }
        Ok(())
    }
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new()
    }
}
