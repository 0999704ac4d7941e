// src/task/mod.rs

//! The task record and its identifiers.
//!
//! - [`model`] holds the persisted [`Task`] record and the [`NewTask`]
//!   request callers hand to `Workflow::add`.
//! - [`id`] allocates and orders `task-NNN` identifiers.

pub mod id;
pub mod model;

pub use id::{format_id, id_number, id_sort_key};
pub use model::{AcceptanceCriterion, NewTask, Task};

/// Canonical task identifier type used throughout the crate.
pub type TaskId = String;
