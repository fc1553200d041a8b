//! Stack lifecycle driver.
//!
//! [`Verifier`] shells out to the configured provisioning binary and walks a
//! stack directory through the init, validate, plan, apply, destroy, and
//! output phases. Every phase call honours the retry policy carried by the
//! stack options, so transient registry or network failures are re-attempted
//! before being reported.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::thread;

use camino::Utf8PathBuf;
use serde::Deserialize;
use thiserror::Error;

use crate::options::{OptionsError, StackOptions};
use crate::phase::{Phase, phase_args};
use crate::runner::{
    CommandOutput, CommandRunner, ProcessCommandRunner, RunnerError, render_command,
};
use crate::tool::{ToolConfig, ToolConfigError};

/// One declared output value read back from a stack.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OutputValue {
    /// Raw JSON value as reported by the tool.
    pub value: serde_json::Value,
    /// Whether the stack marked the value as sensitive.
    #[serde(default)]
    pub sensitive: bool,
}

impl OutputValue {
    /// Returns the value as a string slice when it is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Errors surfaced while driving a stack through its lifecycle.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VerifyError {
    /// Raised when the stack options fail validation.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// Raised when the tool configuration fails validation.
    #[error(transparent)]
    Config(#[from] ToolConfigError),
    /// Raised when the tool binary cannot be spawned.
    #[error(transparent)]
    Spawn(#[from] RunnerError),
    /// Raised when a phase exits non-zero after retries are exhausted.
    #[error("{phase} failed in {dir}: `{command}` exited with status {status_text}: {stderr}")]
    PhaseFailure {
        /// Phase that failed.
        phase: Phase,
        /// Stack directory the phase ran against.
        dir: Utf8PathBuf,
        /// Full command line, shell-quoted for diagnostics.
        command: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the tool.
        stderr: String,
    },
    /// Raised when the JSON output listing cannot be parsed.
    #[error("failed to parse outputs from {dir}: {message}")]
    ParseOutputs {
        /// Stack directory whose outputs were requested.
        dir: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// Raised when a requested output name is not declared by the stack.
    #[error("output {name} not declared by stack {dir}")]
    MissingOutput {
        /// Requested output name.
        name: String,
        /// Stack directory whose outputs were requested.
        dir: Utf8PathBuf,
    },
    /// Raised when an output exists but holds a non-string value.
    #[error("output {name} is not a string value")]
    NotAString {
        /// Requested output name.
        name: String,
    },
}

/// Drives stack directories through tool phases via a [`CommandRunner`].
#[derive(Clone, Debug)]
pub struct Verifier<R: CommandRunner> {
    config: ToolConfig,
    runner: R,
}

impl Verifier<ProcessCommandRunner> {
    /// Creates a verifier wired to the real process runner.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Config`] when the configuration is invalid.
    pub fn with_process_runner(config: ToolConfig) -> Result<Self, VerifyError> {
        Self::new(config, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> Verifier<R> {
    /// Creates a verifier using the provided configuration and runner.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Config`] when the configuration is invalid.
    pub fn new(config: ToolConfig, runner: R) -> Result<Self, VerifyError> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Returns the tool configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Runs the init phase against the stack directory.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the phase fails or cannot be spawned.
    pub fn init(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.run_phase(Phase::Init, options)
    }

    /// Runs the validate phase, a static check that touches no resources.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the phase fails or cannot be spawned.
    pub fn validate_stack(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.run_phase(Phase::Validate, options)
    }

    /// Runs the plan phase with the configured input variables.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the phase fails or cannot be spawned.
    pub fn plan(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.run_phase(Phase::Plan, options)
    }

    /// Runs the apply phase, creating or modifying real resources.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the phase fails or cannot be spawned.
    pub fn apply(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.run_phase(Phase::Apply, options)
    }

    /// Runs the destroy phase, tearing down previously created resources.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the phase fails or cannot be spawned.
    pub fn destroy(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.run_phase(Phase::Destroy, options)
    }

    /// Runs init followed by validate, the cheapest full syntax check.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when either phase fails.
    pub fn check(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.init(options)?;
        self.validate_stack(options)
    }

    /// Runs init followed by plan.
    ///
    /// Useful for asserting that a stack rejects invalid variables before
    /// anything is provisioned.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when either phase fails.
    pub fn init_and_plan(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.init(options)?;
        self.plan(options)
    }

    /// Runs init followed by apply.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when either phase fails.
    pub fn init_and_apply(&self, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        self.init(options)?;
        self.apply(options)
    }

    /// Reads all declared outputs of the stack as a name to value map.
    ///
    /// A stack with no outputs yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::ParseOutputs`] when the tool's JSON cannot be
    /// decoded, and the usual phase errors when the output command fails.
    pub fn outputs(
        &self,
        options: &StackOptions,
    ) -> Result<BTreeMap<String, OutputValue>, VerifyError> {
        let output = self.run_phase(Phase::Output, options)?;
        serde_json::from_str(&output.stdout).map_err(|err| VerifyError::ParseOutputs {
            dir: options.dir().to_owned(),
            message: err.to_string(),
        })
    }

    /// Reads a single named output and requires it to be a string.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MissingOutput`] when the stack does not declare
    /// the name and [`VerifyError::NotAString`] when the value is not a JSON
    /// string.
    pub fn output_string(
        &self,
        options: &StackOptions,
        name: &str,
    ) -> Result<String, VerifyError> {
        let mut outputs = self.outputs(options)?;
        let value = outputs
            .remove(name)
            .ok_or_else(|| VerifyError::MissingOutput {
                name: name.to_owned(),
                dir: options.dir().to_owned(),
            })?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| VerifyError::NotAString {
                name: name.to_owned(),
            })
    }

    /// Runs one phase, retrying on recognised transient failures.
    fn run_phase(&self, phase: Phase, options: &StackOptions) -> Result<CommandOutput, VerifyError> {
        options.validate()?;
        let args = phase_args(phase, options);
        let policy = options.retry();
        let mut attempt = 1_u32;
        loop {
            let output = self.runner.run(&self.config.tool_bin, &args)?;
            if output.is_success() {
                return Ok(output);
            }
            if attempt < policy.max_attempts() && policy.classify(&output).is_some() {
                attempt += 1;
                thread::sleep(policy.backoff());
                continue;
            }
            return Err(self.phase_failure(phase, options, &args, output));
        }
    }

    fn phase_failure(
        &self,
        phase: Phase,
        options: &StackOptions,
        args: &[OsString],
        output: CommandOutput,
    ) -> VerifyError {
        let status_text = output.status_text();
        VerifyError::PhaseFailure {
            phase,
            dir: options.dir().to_owned(),
            command: render_command(&self.config.tool_bin, args),
            status: output.code,
            status_text,
            stderr: output.stderr,
        }
    }
}
