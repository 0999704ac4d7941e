// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the optional config file inside a workflow directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load `<workflow_dir>/config.toml`, falling back to defaults when the file
/// does not exist. A file that exists but is invalid is an error.
pub fn load_for_workflow(workflow_dir: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = workflow_dir.as_ref().join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!(path = ?path, "no config file; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(&path)
}

/// Workflow directory used when none is given on the command line.
///
/// `TASKGRAPH_DIR` wins if set; otherwise `.workflow` in the current
/// working directory.
pub fn default_workflow_dir() -> PathBuf {
    std::env::var_os("TASKGRAPH_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".workflow"))
}
