// src/config/mod.rs

//! Configuration loading and validation for a workflow directory.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load `<workflow dir>/config.toml` from disk (`loader.rs`).
//! - Validate basic invariants like backup retention (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{CONFIG_FILE_NAME, default_workflow_dir, load_and_validate, load_for_workflow, load_from_path};
pub use model::{ConfigFile, DefaultsSection, RawConfigFile, StoreSection};
