// src/lifecycle/criteria.rs

use tracing::{debug, info};

use crate::errors::{Result, TaskGraphError};
use crate::task::Task;

/// Mark criterion `index` as passed.
///
/// Passing is one-way: an already-passed criterion stays passed and the call
/// returns `false`. Only `regress` can reset a criterion.
pub fn pass_criterion(task: &mut Task, index: usize) -> Result<bool> {
    let len = task.acceptance_criteria.len();
    let criterion = task
        .acceptance_criteria
        .get_mut(index)
        .ok_or_else(|| TaskGraphError::CriterionOutOfRange {
            task: task.id.clone(),
            index,
            len,
        })?;

    if criterion.passed {
        debug!(task = %task.id, index, "criterion already passed");
        return Ok(false);
    }

    criterion.passed = true;
    info!(
        task = %task.id,
        index,
        criterion = %criterion.criterion,
        "acceptance criterion passed"
    );
    Ok(true)
}
