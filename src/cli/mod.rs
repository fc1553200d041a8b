//! Command-line interface definitions for the `sproba` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `sproba` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sproba",
    about = "Provision, verify, and tear down infrastructure stack directories",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Run init and validate across one or more stack directories.
    #[command(name = "check", about = "Syntax-check stack directories without provisioning")]
    Check(CheckCommand),
    /// Provision a stack, assert on its outputs, and tear it down.
    #[command(name = "verify", about = "Provision a stack, assert on outputs, and destroy it")]
    Verify(VerifyCommand),
}

/// Arguments for the `sproba check` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct CheckCommand {
    /// Stack directories to check.
    #[arg(required = true, value_name = "DIR")]
    pub(crate) dirs: Vec<String>,
}

/// Arguments for the `sproba verify` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct VerifyCommand {
    /// Stack directory to drive through the lifecycle.
    #[arg(value_name = "DIR")]
    pub(crate) dir: String,
    /// Input variable as a NAME=VALUE pair; repeatable.
    ///
    /// Values parse as booleans (`true`/`false`) or integers where they look
    /// like one, and stay strings otherwise.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub(crate) vars: Vec<String>,
    /// Stop after the plan phase instead of applying.
    #[arg(long = "plan", conflicts_with = "expect_outputs")]
    pub(crate) plan_only: bool,
    /// Require a string output to equal a value after apply, as NAME=VALUE;
    /// repeatable.
    #[arg(long = "expect-output", value_name = "NAME=VALUE")]
    pub(crate) expect_outputs: Vec<String>,
    /// Leave the stack provisioned instead of destroying it on exit.
    #[arg(long)]
    pub(crate) keep: bool,
}
