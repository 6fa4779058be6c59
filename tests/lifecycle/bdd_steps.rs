//! BDD step definitions for the apply-then-destroy lifecycle.

use terraprobe::{CheckError, Lifecycle, Terraform};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{FailureStage, LifecycleContext, LifecycleOutcome, state_listing};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a terraform configuration directory")]
fn configuration_directory(lifecycle_context: LifecycleContext) -> LifecycleContext {
    std::fs::write(
        lifecycle_context.dir.join("main.tf"),
        "resource \"terraform_data\" \"probe\" {}\n",
    )
    .unwrap_or_else(|err| panic!("main.tf should be written: {err}"));
    lifecycle_context
}

#[given("a missing terraform configuration directory")]
fn missing_directory(mut lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context.dir = lifecycle_context.dir.join("absent");
    lifecycle_context
}

#[given("terraform init succeeds")]
fn init_succeeds(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context
        .runner
        .push_output(Some(0), "Terraform has been successfully initialized!\n", "");
    lifecycle_context
}

#[given("terraform apply reports {added:u32} added")]
fn apply_reports(lifecycle_context: LifecycleContext, added: u32) -> LifecycleContext {
    lifecycle_context.runner.push_apply_success(added as usize);
    lifecycle_context
}

#[given("terraform apply fails with \"{message}\"")]
fn apply_fails(lifecycle_context: LifecycleContext, message: String) -> LifecycleContext {
    lifecycle_context.runner.push_output(Some(1), "", message);
    lifecycle_context
}

#[given("terraform state lists {count:u32} resources")]
fn state_lists(lifecycle_context: LifecycleContext, count: u32) -> LifecycleContext {
    lifecycle_context
        .runner
        .push_output(Some(0), state_listing(count), "");
    lifecycle_context
}

#[given("terraform destroy succeeds")]
fn destroy_succeeds(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context.runner.push_destroy_success(1);
    lifecycle_context
}

#[given("terraform destroy fails with \"{message}\"")]
fn destroy_fails(lifecycle_context: LifecycleContext, message: String) -> LifecycleContext {
    lifecycle_context.runner.push_output(Some(1), "", message);
    lifecycle_context
}

#[when("I run the lifecycle")]
fn run_lifecycle(mut lifecycle_context: LifecycleContext) -> LifecycleContext {
    let lifecycle = Lifecycle::new(Terraform::new(lifecycle_context.runner.clone()));
    let result = lifecycle.run(&lifecycle_context.options());
    lifecycle_context.outcome = Some(match result {
        Ok(report) => LifecycleOutcome::Success(report),
        Err(err) => LifecycleOutcome::Failure {
            stage: FailureStage::of(&err),
            message: err.to_string(),
        },
    });
    lifecycle_context
}

#[when("I run the lifecycle expecting {expected:u32} resources")]
fn run_lifecycle_with_count(
    mut lifecycle_context: LifecycleContext,
    expected: u32,
) -> LifecycleContext {
    let lifecycle = Lifecycle::new(Terraform::new(lifecycle_context.runner.clone()));
    let result = lifecycle.run_with(&lifecycle_context.options(), |terraform, options| {
        let resources = terraform.state_list(options)?;
        if resources.len() == expected as usize {
            Ok(())
        } else {
            Err(CheckError::from(format!(
                "expected {expected} resources, found {}",
                resources.len()
            )))
        }
    });
    lifecycle_context.outcome = Some(match result {
        Ok(report) => LifecycleOutcome::Success(report),
        Err(err) => LifecycleOutcome::Failure {
            stage: FailureStage::of(&err),
            message: err.to_string(),
        },
    });
    lifecycle_context
}

#[then("the lifecycle succeeds with {added:u32} added")]
fn succeeds_with(lifecycle_context: &LifecycleContext, added: u32) -> Result<(), StepError> {
    match lifecycle_context.outcome.as_ref() {
        Some(LifecycleOutcome::Success(report))
            if report.applied.map(|counts| counts.added) == Some(added as usize) =>
        {
            Ok(())
        }
        other => Err(StepError::Assertion(format!(
            "expected success with {added} added, got {other:?}"
        ))),
    }
}

#[then("the lifecycle fails during \"{stage}\"")]
fn fails_during(lifecycle_context: &LifecycleContext, stage: String) -> Result<(), StepError> {
    let expected = FailureStage::parse(stage.trim())
        .ok_or_else(|| StepError::Assertion(format!("unknown stage: {stage}")))?;
    match lifecycle_context.outcome.as_ref() {
        Some(LifecycleOutcome::Failure { stage: actual, .. }) if *actual == expected => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure during {stage}, got {other:?}"
        ))),
    }
}

#[then("the failure mentions \"{text}\"")]
fn failure_mentions(lifecycle_context: &LifecycleContext, text: String) -> Result<(), StepError> {
    match lifecycle_context.outcome.as_ref() {
        Some(LifecycleOutcome::Failure { message, .. }) if message.contains(text.as_str()) => {
            Ok(())
        }
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text:?}, got {other:?}"
        ))),
    }
}

#[then("terraform ran \"{commands}\"")]
fn terraform_ran(lifecycle_context: &LifecycleContext, commands: String) -> Result<(), StepError> {
    let expected: Vec<String> = commands.split_whitespace().map(str::to_owned).collect();
    let actual = lifecycle_context.runner.subcommands();
    if actual == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {expected:?}, got {actual:?}"
        )))
    }
}

#[then("terraform was never invoked")]
fn never_invoked(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    let invocations = lifecycle_context.runner.invocations();
    if invocations.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no invocations, got {invocations:?}"
        )))
    }
}
