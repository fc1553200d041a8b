//! Binary entry point for the sproba CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use sproba::{
    CommandRunner, DestroyGuard, ProcessCommandRunner, StackOptions, ToolConfig, VarParseError,
    Verifier, VerifyError, parse_var_arg,
};

mod cli;

use cli::{CheckCommand, Cli, VerifyCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid --var argument: {0}")]
    Var(#[from] VarParseError),
    #[error("invalid --expect-output argument: {0}")]
    Expectation(String),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error("output {name} was {actual:?}, expected {expected:?}")]
    OutputMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Check(command) => check_command(&command),
        Cli::Verify(command) => verify_command(&command),
    }
}

fn load_verifier() -> Result<Verifier<ProcessCommandRunner>, CliError> {
    let config =
        ToolConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    Verifier::with_process_runner(config).map_err(CliError::from)
}

fn check_command(args: &CheckCommand) -> Result<i32, CliError> {
    let verifier = load_verifier()?;
    for dir in &args.dirs {
        let options = StackOptions::builder()
            .dir(dir.as_str())
            .retry(verifier.config().retry_policy())
            .build()
            .map_err(VerifyError::from)?;
        verifier.check(&options)?;
        writeln!(io::stdout(), "ok: {dir}").ok();
    }
    Ok(0)
}

fn verify_command(args: &VerifyCommand) -> Result<i32, CliError> {
    let verifier = load_verifier()?;
    let options = build_options(args, verifier.config())?;

    if args.plan_only {
        verifier.init_and_plan(&options)?;
        writeln!(io::stdout(), "plan ok: {}", options.dir()).ok();
        return Ok(0);
    }

    verifier.init(&options)?;

    if args.keep {
        verifier.apply(&options)?;
        check_expectations(&verifier, &options, &args.expect_outputs)?;
        writeln!(io::stdout(), "applied and kept: {}", options.dir()).ok();
        return Ok(0);
    }

    let guard = DestroyGuard::new(&verifier, options);
    verifier.apply(guard.options())?;
    check_expectations(&verifier, guard.options(), &args.expect_outputs)?;
    let dir = guard.options().dir().to_owned();
    guard.finish()?;
    writeln!(io::stdout(), "verified: {dir}").ok();
    Ok(0)
}

fn build_options(args: &VerifyCommand, config: &ToolConfig) -> Result<StackOptions, CliError> {
    let mut builder = StackOptions::builder()
        .dir(args.dir.as_str())
        .retry(config.retry_policy());
    for raw in &args.vars {
        let (name, value) = parse_var_arg(raw)?;
        builder = builder.var(name, value);
    }
    builder
        .build()
        .map_err(|err| CliError::Verify(VerifyError::from(err)))
}

fn check_expectations<R: CommandRunner>(
    verifier: &Verifier<R>,
    options: &StackOptions,
    expectations: &[String],
) -> Result<(), CliError> {
    for raw in expectations {
        let (name, expected) = parse_expectation(raw)?;
        let actual = verifier.output_string(options, &name)?;
        if actual != expected {
            return Err(CliError::OutputMismatch {
                name,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn parse_expectation(raw: &str) -> Result<(String, String), CliError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(CliError::Expectation(format!(
            "expected NAME=VALUE, got `{raw}`"
        )));
    };
    let trimmed_name = name.trim();
    if trimmed_name.is_empty() {
        return Err(CliError::Expectation(format!(
            "output name must not be empty in `{raw}`"
        )));
    }
    Ok((trimmed_name.to_owned(), value.to_owned()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
