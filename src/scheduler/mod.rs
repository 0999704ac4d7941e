// src/scheduler/mod.rs

//! Selection policy: which task should the executor work on next?
//!
//! - [`select`] picks the single next actionable task. It is a pure function
//!   of the task set, so polling it repeatedly is safe.
//! - [`stats`] aggregates status counts and explains why nothing is
//!   selectable when `next` comes back empty.

pub mod select;
pub mod stats;

pub use select::{Selection, SelectionReason, next};
pub use stats::{IdleState, TaskStats};
