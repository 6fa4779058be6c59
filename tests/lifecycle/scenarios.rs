//! BDD scenarios for the lifecycle driver.

use rstest_bdd_macros::scenario;

use super::test_helpers::{LifecycleContext, lifecycle_context};

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Apply and destroy a single resource"
)]
fn scenario_apply_and_destroy(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Destroy after apply rejects an undeclared variable"
)]
fn scenario_undeclared_variable(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Report teardown failures alongside apply failures"
)]
fn scenario_teardown_note(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Surface destroy failures after a successful apply"
)]
fn scenario_destroy_failure(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Verify the resource count before destroying"
)]
fn scenario_resource_count(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Destroy when the resource count check fails"
)]
fn scenario_resource_count_mismatch(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Reject a missing configuration directory without running terraform"
)]
fn scenario_missing_directory(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}
