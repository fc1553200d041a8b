//! Shared fixtures and helpers for sweeper BDD scenarios.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;
use sproba::test_support::json_state;
use sproba::{DEFAULT_STATE_FILE, SweepSummary, ToolConfig, Verifier};
use tempfile::TempDir;

use super::test_doubles::ClearingRunner;

/// Result of one sweep run.
#[derive(Clone, Debug)]
pub enum SweepOutcome {
    Success(SweepSummary),
    Failure(String),
}

/// Mutable state threaded through the scenario steps.
#[derive(Clone, Debug)]
pub struct SweeperContext {
    pub root: Utf8PathBuf,
    pub runner: ClearingRunner,
    pub leaked_dir: Option<Utf8PathBuf>,
    pub outcome: Option<SweepOutcome>,
    _root_tmp: Arc<TempDir>,
}

#[fixture]
pub fn sweeper_context() -> SweeperContext {
    let root_tmp =
        Arc::new(TempDir::new().unwrap_or_else(|err| panic!("create sweep root: {err}")));
    let root = Utf8PathBuf::from_path_buf(root_tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("sweep root should be UTF-8: {}", path.display()));
    SweeperContext {
        root,
        runner: ClearingRunner::new(),
        leaked_dir: None,
        outcome: None,
        _root_tmp: root_tmp,
    }
}

/// Creates a child directory with a state file tracking `resources` entries.
pub fn write_stack_dir(root: &Utf8Path, name: &str, resources: usize) -> Utf8PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("create stack dir {dir}: {err}"));
    std::fs::write(dir.join(DEFAULT_STATE_FILE), json_state(resources))
        .unwrap_or_else(|err| panic!("write state for {dir}: {err}"));
    dir
}

/// Creates a child directory with no state file.
pub fn write_bare_dir(root: &Utf8Path, name: &str) -> Utf8PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("create stack dir {dir}: {err}"));
    dir
}

/// Builds a verifier over the context's runner double.
pub fn build_verifier(runner: &ClearingRunner) -> Verifier<ClearingRunner> {
    Verifier::new(ToolConfig::default(), runner.clone())
        .unwrap_or_else(|err| panic!("verifier should build: {err}"))
}
