//! Shared fixtures and helpers for verification BDD scenarios.

use rstest::fixture;
use sproba::test_support::ScriptedRunner;
use sproba::{StackOptions, ToolConfig, Verifier};

/// Stack directory targeted by the scenarios.
pub const STACK_DIR: &str = "stacks/local-multipass-vm";

/// Result of driving a scenario through the verifier.
#[derive(Clone, Debug)]
pub enum VerifyOutcome {
    /// The scenario finished and produced this output value.
    Output(String),
    /// The scenario failed with this rendered error.
    Failure(String),
}

/// Mutable state threaded through the scenario steps.
#[derive(Clone, Debug)]
pub struct VerifyContext {
    pub runner: ScriptedRunner,
    pub verifier: Option<Verifier<ScriptedRunner>>,
    pub outcome: Option<VerifyOutcome>,
}

#[fixture]
pub fn verify_context() -> VerifyContext {
    VerifyContext {
        runner: ScriptedRunner::new(),
        verifier: None,
        outcome: None,
    }
}

/// Builds a verifier over the context's scripted runner.
pub fn build_verifier(runner: &ScriptedRunner) -> Verifier<ScriptedRunner> {
    Verifier::new(ToolConfig::default(), runner.clone())
        .unwrap_or_else(|err| panic!("verifier should build: {err}"))
}

/// Options matching the happy-path virtual machine scenario.
pub fn vm_options() -> StackOptions {
    StackOptions::builder()
        .dir(STACK_DIR)
        .var("vm_name", "test-vm")
        .var("cpus", 2)
        .var("memory", "2G")
        .var("disk", "10G")
        .build()
        .unwrap_or_else(|err| panic!("stack options should build: {err}"))
}

/// Options carrying empty and zero values the configuration rejects at plan.
pub fn invalid_options() -> StackOptions {
    StackOptions::builder()
        .dir(STACK_DIR)
        .var("vm_name", "")
        .var("cpus", 0)
        .var("memory", "0G")
        .var("disk", "0G")
        .build()
        .unwrap_or_else(|err| panic!("stack options should build: {err}"))
}
