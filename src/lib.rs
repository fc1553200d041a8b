//! Core library for the sproba infrastructure verification harness.
//!
//! The crate drives OpenTofu-compatible stack directories through their
//! lifecycle (init → validate → plan → apply → output → destroy) by shelling
//! out to the configured binary, with transient-failure retries, scoped
//! teardown guards for provisioned stacks, and a sweeper that destroys
//! leftovers from crashed runs.

pub mod guard;
pub mod options;
pub mod phase;
pub mod retry;
pub mod runner;
pub mod sweeper;
pub mod test_support;
pub mod tool;
pub mod vars;
pub mod verify;

pub use guard::DestroyGuard;
pub use options::{OptionsError, StackOptions, StackOptionsBuilder, unique_stack_name};
pub use phase::Phase;
pub use retry::{
    DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, RetryError, RetryPolicy, TransientSignature,
};
pub use runner::{CommandOutput, CommandRunner, ProcessCommandRunner, RunnerError, render_command};
pub use sweeper::{DEFAULT_STATE_FILE, SWEEP_ROOT_ENV, SweepError, SweepSummary, Sweeper};
pub use tool::{DEFAULT_TOOL_BIN, ToolConfig, ToolConfigError, ToolConfigLoadError};
pub use vars::{VarParseError, VarValue, parse_var_arg};
pub use verify::{OutputValue, Verifier, VerifyError};
