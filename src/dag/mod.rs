// src/dag/mod.rs

//! Dependency graph over task ids.
//!
//! - [`graph`] holds adjacency (dependencies and dependents) for a task set.
//! - [`validate`] reports structural problems and gates admission of new or
//!   edited tasks (dangling references, cycles).
//! - [`blocking`] recomputes the derived `blocked_by` / `blocks` fields and
//!   the automatic `pending` <-> `blocked` transitions.

pub mod blocking;
pub mod graph;
pub mod validate;

pub use blocking::{BlockingChanges, completed_ids, dependencies_met, inverse_edges, recompute_blocking};
pub use graph::DependencyGraph;
pub use validate::{Problem, check_admission, validate};
