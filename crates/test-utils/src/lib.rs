pub mod builders;
pub mod fake_executor;

use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};

use taskgraph::Workflow;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// A fresh workflow in its own temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the workflow is used.
pub fn temp_workflow() -> anyhow::Result<(TempDir, Workflow)> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let workflow = Workflow::open(dir.path())?;
    Ok((dir, workflow))
}
