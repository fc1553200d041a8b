//! BDD scenarios for stack verification.

use rstest_bdd_macros::scenario;

use super::test_helpers::{VerifyContext, verify_context};

#[scenario(
    path = "tests/features/verify.feature",
    name = "Provision a stack and read its output"
)]
fn scenario_provision_and_read(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verify.feature",
    name = "Tear down after a failed output assertion"
)]
fn scenario_teardown_after_failed_assertion(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verify.feature",
    name = "Reject invalid variables during plan"
)]
fn scenario_reject_invalid_variables(verify_context: VerifyContext) {
    let _ = verify_context;
}
