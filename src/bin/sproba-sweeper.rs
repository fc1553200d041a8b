//! Leftover-stack sweeper for sproba.
//!
//! This binary destroys stacks under a root directory whose state files
//! still track resources, typically left behind by crashed test runs, and
//! then verifies the set is empty.

use clap::Parser;
use sproba::{DEFAULT_TOOL_BIN, SWEEP_ROOT_ENV, Sweeper, ToolConfig, Verifier};
use std::io::Write as _;

#[derive(Debug, Parser)]
#[command(
    name = "sproba-sweeper",
    about = "Destroy leftover stacks under a root directory"
)]
struct Cli {
    /// Root directory whose child directories are scanned for state files.
    #[arg(long, env = SWEEP_ROOT_ENV)]
    root: String,
    /// Name or path of the provisioning binary.
    #[arg(long, env = "SPROBA_TOOL_BIN", default_value = DEFAULT_TOOL_BIN)]
    tool_bin: String,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = ToolConfig {
        tool_bin: cli.tool_bin,
        ..ToolConfig::default()
    };
    let verifier = Verifier::with_process_runner(config).map_err(|err| err.to_string())?;
    let sweeper = Sweeper::new(verifier, cli.root).map_err(|err| err.to_string())?;
    let summary = sweeper.sweep().map_err(|err| err.to_string())?;
    writeln!(
        std::io::stdout(),
        "sweep complete: scanned_dirs={}, destroyed_stacks={}",
        summary.scanned_dirs,
        summary.destroyed_stacks
    )
    .map_err(|err| err.to_string())?;
    Ok(())
}
