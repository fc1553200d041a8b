//! Phase vocabulary and per-phase argument construction.
//!
//! Every operation on a stack is one of a fixed set of tool subcommands.
//! Argument vectors are built here so the exact command line for each phase
//! is specified in a single place.

use std::ffi::OsString;
use std::fmt;

use crate::options::StackOptions;

/// One invocation phase of the provisioning tool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Prepares the tool's working state for a target directory.
    Init,
    /// Static syntax and schema check, no resources touched.
    Validate,
    /// Dry-run diff of intended changes.
    Plan,
    /// Executes the plan, creating or modifying resources.
    Apply,
    /// Tears down resources previously created by apply.
    Destroy,
    /// Reads declared output values as JSON.
    Output,
}

impl Phase {
    /// Subcommand name passed to the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Validate => "validate",
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Destroy => "destroy",
            Self::Output => "output",
        }
    }

    const fn takes_input_flag(self) -> bool {
        matches!(self, Self::Init | Self::Plan | Self::Apply | Self::Destroy)
    }

    const fn auto_approves(self) -> bool {
        matches!(self, Self::Apply | Self::Destroy)
    }

    const fn takes_vars(self) -> bool {
        matches!(self, Self::Plan | Self::Apply | Self::Destroy)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the full argument vector for one phase invocation.
///
/// The target directory travels via the tool's global `-chdir` flag so the
/// harness never changes its own working directory.
pub(crate) fn phase_args(phase: Phase, options: &StackOptions) -> Vec<OsString> {
    let mut args = vec![
        OsString::from(format!("-chdir={}", options.dir())),
        OsString::from(phase.as_str()),
    ];
    if phase.takes_input_flag() {
        args.push(OsString::from("-input=false"));
    }
    if phase.auto_approves() {
        args.push(OsString::from("-auto-approve"));
    }
    if matches!(phase, Phase::Output) {
        args.push(OsString::from("-json"));
    }
    if options.no_color() {
        args.push(OsString::from("-no-color"));
    }
    if phase.takes_vars() {
        args.extend(options.var_args());
    }
    args
}
