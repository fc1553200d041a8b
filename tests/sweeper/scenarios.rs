//! BDD scenarios for the leftover-stack sweeper.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SweeperContext, sweeper_context};

#[scenario(
    path = "tests/features/sweeper.feature",
    name = "Destroy leftover stacks and verify a clean root"
)]
fn scenario_destroy_leftovers(sweeper_context: SweeperContext) {
    let _ = sweeper_context;
}

#[scenario(
    path = "tests/features/sweeper.feature",
    name = "Fail the sweep when state survives destruction"
)]
fn scenario_fail_when_not_clean(sweeper_context: SweeperContext) {
    let _ = sweeper_context;
}
