//! Test doubles for sweeper scenarios.
//!
//! Provides `ClearingRunner`, which wraps the library's scripted runner and,
//! when enabled, empties the target directory's state file after a successful
//! destroy, the way the real tool rewrites state once resources are gone.

use std::ffi::OsString;

use sproba::test_support::{ScriptedRunner, json_state};
use sproba::{CommandOutput, CommandRunner, DEFAULT_STATE_FILE, RunnerError};

#[derive(Clone, Debug)]
pub struct ClearingRunner {
    pub inner: ScriptedRunner,
    pub clear_on_destroy: bool,
}

impl ClearingRunner {
    pub fn new() -> Self {
        Self {
            inner: ScriptedRunner::new(),
            clear_on_destroy: true,
        }
    }
}

impl Default for ClearingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ClearingRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError> {
        let output = self.inner.run(program, args)?;
        if self.clear_on_destroy
            && output.is_success()
            && args.iter().any(|arg| arg.to_string_lossy() == "destroy")
            && let Some(target) = args.iter().find_map(|arg| {
                arg.to_str()
                    .and_then(|text| text.strip_prefix("-chdir="))
                    .map(str::to_owned)
            })
        {
            std::fs::write(
                std::path::Path::new(&target).join(DEFAULT_STATE_FILE),
                json_state(0),
            )
            .map_err(|err| RunnerError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })?;
        }
        Ok(output)
    }
}
