// src/lifecycle/mod.rs

//! Per-task state machine.
//!
//! - [`transitions`] holds the transition table and the operations that
//!   apply it to a single task (`start`, `complete`, `fail`, `retry`,
//!   `regress`).
//! - [`retry`] maps a failure to a [`FailureDisposition`] according to the
//!   task's error strategy.
//! - [`criteria`] tracks acceptance criteria.
//!
//! Everything here works on one `&mut Task`. Recomputing the blocking state
//! of *other* tasks afterwards is the caller's job (see `Workflow`).

pub mod criteria;
pub mod retry;
pub mod transitions;

pub use criteria::pass_criterion;
pub use retry::{FailureDisposition, disposition};
pub use transitions::{Event, complete, fail, next_status, regress, retry, start};
