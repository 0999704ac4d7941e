// src/cli.rs

//! CLI argument parsing using `clap` derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::ErrorStrategy;

/// Command-line arguments for `taskgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskgraph",
    version,
    about = "Persistent task dependency graph with a retrying lifecycle.",
    long_about = None
)]
pub struct CliArgs {
    /// Workflow directory holding `tasks.json` and friends.
    ///
    /// Default: `$TASKGRAPH_DIR`, else `.workflow` in the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKGRAPH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the workflow directory with a default config and no tasks.
    Init,

    /// Add a task.
    Add(AddArgs),

    /// Show the task to work on next.
    Next,

    /// Mark a task in progress.
    Start { id: String },

    /// Mark a task completed and unblock its dependents.
    Complete { id: String },

    /// Record a failure for a task.
    Fail { id: String, message: String },

    /// Put a failed task back in progress if it has retries left.
    Retry { id: String },

    /// Reopen a task because earlier work regressed.
    Regress {
        id: String,

        #[arg(long)]
        reason: Option<String>,

        /// Index of an acceptance criterion to reset (repeatable).
        #[arg(long = "reset-criterion", value_name = "IDX")]
        reset_criteria: Vec<usize>,
    },

    /// Mark an acceptance criterion as passed.
    Pass { id: String, index: usize },

    /// Replace a task's dependencies.
    Deps {
        id: String,

        #[arg(long = "on", value_name = "ID")]
        on: Vec<String>,
    },

    /// Delete a task nothing depends on.
    Remove { id: String },

    /// Print one task in full.
    Show { id: String },

    /// List all tasks.
    List {
        #[arg(long, value_enum, default_value_t = ListOrder::Id)]
        order: ListOrder,
    },

    /// Print progress counts.
    Status,

    /// Check the stored graph for structural problems.
    Validate,
}

#[derive(Debug, Clone, clap::Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Lower runs first; unset runs after every set value.
    #[arg(long, allow_negative_numbers = true)]
    pub priority: Option<i64>,

    #[arg(long = "step", value_name = "TEXT")]
    pub steps: Vec<String>,

    #[arg(long = "depends-on", value_name = "ID")]
    pub depends_on: Vec<String>,

    #[arg(long)]
    pub max_retries: Option<u32>,

    /// retry, skip or escalate.
    #[arg(long)]
    pub strategy: Option<ErrorStrategy>,

    /// Automatically verified criterion, as `TEXT` or `TEXT::COMMAND`.
    #[arg(long = "criterion", value_name = "TEXT")]
    pub criteria: Vec<String>,

    #[arg(long = "manual-criterion", value_name = "TEXT")]
    pub manual_criteria: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Ordering for `list`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ListOrder {
    /// Creation order.
    Id,
    /// Dependencies before dependents.
    Topo,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
