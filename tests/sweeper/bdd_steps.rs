//! BDD step definitions for sweeper behaviour.

use rstest_bdd_macros::{given, then, when};
use sproba::Sweeper;

use super::test_helpers::{
    SweepOutcome, SweeperContext, build_verifier, write_bare_dir, write_stack_dir,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a root with one leaked stack and one clean stack")]
fn root_with_one_leak(mut sweeper_context: SweeperContext) -> SweeperContext {
    let leaked = write_stack_dir(&sweeper_context.root, "leaked", 2);
    write_bare_dir(&sweeper_context.root, "fresh");
    sweeper_context.runner.inner.push_success(); // destroy leaked
    sweeper_context.leaked_dir = Some(leaked);
    sweeper_context
}

#[given("a root with a stack whose state survives destruction")]
fn root_with_stubborn_stack(mut sweeper_context: SweeperContext) -> SweeperContext {
    let leaked = write_stack_dir(&sweeper_context.root, "stubborn", 1);
    sweeper_context.runner.clear_on_destroy = false;
    sweeper_context.runner.inner.push_success(); // destroy reports success, state remains
    sweeper_context.leaked_dir = Some(leaked);
    sweeper_context
}

#[when("I run the sweeper")]
fn run_the_sweeper(mut sweeper_context: SweeperContext) -> SweeperContext {
    let verifier = build_verifier(&sweeper_context.runner);
    let sweeper = Sweeper::new(verifier, sweeper_context.root.clone())
        .unwrap_or_else(|err| panic!("sweeper should build: {err}"));
    sweeper_context.outcome = Some(match sweeper.sweep() {
        Ok(summary) => SweepOutcome::Success(summary),
        Err(err) => SweepOutcome::Failure(err.to_string()),
    });
    sweeper_context
}

#[then("the sweeper reports scanning {scanned:u32} directories and destroying {destroyed:u32} stack")]
fn reports_summary(
    sweeper_context: &SweeperContext,
    scanned: u32,
    destroyed: u32,
) -> Result<(), StepError> {
    let Some(outcome) = sweeper_context.outcome.as_ref() else {
        return Err(StepError::Assertion(String::from("missing outcome")));
    };
    let SweepOutcome::Success(summary) = outcome else {
        return Err(StepError::Assertion(format!(
            "expected success, got: {outcome:?}"
        )));
    };
    if summary.scanned_dirs == scanned as usize && summary.destroyed_stacks == destroyed as usize {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {scanned} scanned and {destroyed} destroyed, got {summary:?}"
        )))
    }
}

#[then("the destroy targets the leaked stack")]
fn destroy_targets_the_leak(sweeper_context: &SweeperContext) -> Result<(), StepError> {
    let Some(leaked) = sweeper_context.leaked_dir.as_ref() else {
        return Err(StepError::Assertion(String::from("missing leaked dir")));
    };
    let invocations = sweeper_context.runner.inner.invocations();
    let destroy_call = invocations
        .iter()
        .find(|call| call.subcommand().as_deref() == Some("destroy"))
        .ok_or_else(|| StepError::Assertion(String::from("missing destroy invocation")))?;

    let chdir = format!("-chdir={leaked}");
    if destroy_call
        .args
        .iter()
        .any(|arg| arg.to_string_lossy() == chdir)
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {chdir}, got args: {:?}",
            destroy_call.args
        )))
    }
}

#[then("the sweeper reports a not-clean error")]
fn reports_not_clean(sweeper_context: &SweeperContext) -> Result<(), StepError> {
    let Some(outcome) = sweeper_context.outcome.as_ref() else {
        return Err(StepError::Assertion(String::from("missing outcome")));
    };
    let SweepOutcome::Failure(message) = outcome else {
        return Err(StepError::Assertion(String::from(
            "expected the sweep to fail, got success",
        )));
    };
    if message.contains("stacks remain after sweep") {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected a not-clean error, got: {message}"
        )))
    }
}
