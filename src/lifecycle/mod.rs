//! Apply-then-destroy lifecycle used as a smoke test.
//!
//! The lifecycle validates the configuration directory, arms a
//! [`DestroyGuard`], runs `init` and `apply`, optionally runs a caller check
//! against the live infrastructure, and finally destroys everything. Destroy
//! runs on every exit path: success, apply failure, check failure, and a
//! panic inside the check. Nothing is retried.

use std::error::Error as StdError;
use std::fmt::Display;

use thiserror::Error;
use tracing::info_span;
use uuid::Uuid;

use crate::guard::DestroyGuard;
use crate::options::{OptionsError, TerraformOptions};
use crate::runner::CommandRunner;
use crate::terraform::{ChangeSummary, Terraform, TerraformError};

/// Boxed error returned by verification checks.
pub type CheckError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by a lifecycle run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Raised when the options are unusable; nothing was provisioned.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// Raised when `init` or `apply` fails. Destroy has already run.
    #[error("terraform apply failed: {message}")]
    Apply {
        /// Failure description, including any teardown failure.
        message: String,
        /// Underlying Terraform error.
        #[source]
        source: TerraformError,
    },
    /// Raised when the verification check fails. Destroy has already run.
    #[error("infrastructure check failed: {message}")]
    Check {
        /// Failure description, including any teardown failure.
        message: String,
        /// Error returned by the check.
        #[source]
        source: CheckError,
    },
    /// Raised when destroy fails after everything else succeeded.
    #[error("terraform destroy failed: {0}")]
    Destroy(#[source] TerraformError),
}

/// Outcome of a successful lifecycle run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LifecycleReport {
    /// Identifier correlating the log lines of this run.
    pub run_id: Uuid,
    /// Counts reported by `apply`, when printed.
    pub applied: Option<ChangeSummary>,
    /// Counts reported by `destroy`, when printed.
    pub destroyed: Option<ChangeSummary>,
}

/// Runs the apply-then-destroy lifecycle through a Terraform client.
#[derive(Clone, Debug)]
pub struct Lifecycle<R: CommandRunner> {
    terraform: Terraform<R>,
}

impl<R: CommandRunner> Lifecycle<R> {
    /// Creates a lifecycle driver.
    #[must_use]
    pub const fn new(terraform: Terraform<R>) -> Self {
        Self { terraform }
    }

    /// Returns the underlying Terraform client.
    #[must_use]
    pub const fn terraform(&self) -> &Terraform<R> {
        &self.terraform
    }

    /// Initialises and applies the configuration, then destroys it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the options are invalid, apply fails,
    /// or destroy fails.
    pub fn run(&self, options: &TerraformOptions) -> Result<LifecycleReport, LifecycleError> {
        self.run_with(options, |_, _| Ok(()))
    }

    /// Like [`Lifecycle::run`], but runs `check` between apply and destroy.
    ///
    /// `check` receives the Terraform client and options so it can inspect
    /// state or outputs. If it returns an error or panics, destroy still
    /// runs before the failure propagates.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the options are invalid, apply fails,
    /// the check fails, or destroy fails.
    pub fn run_with<F>(
        &self,
        options: &TerraformOptions,
        check: F,
    ) -> Result<LifecycleReport, LifecycleError>
    where
        F: FnOnce(&Terraform<R>, &TerraformOptions) -> Result<(), CheckError>,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("lifecycle", %run_id, dir = %options.terraform_dir());
        let _entered = span.enter();

        options.validate()?;

        let guard = DestroyGuard::new(&self.terraform, options);
        tracing::info!("applying terraform configuration");
        let applied = match self.terraform.init_and_apply(options) {
            Ok(summary) => summary,
            Err(err) => {
                let message = release_with_note(guard, &err);
                return Err(LifecycleError::Apply {
                    message,
                    source: err,
                });
            }
        };
        tracing::info!(
            added = applied.map(|counts| counts.added),
            "terraform apply finished"
        );

        if let Err(err) = check(&self.terraform, options) {
            let message = release_with_note(guard, &err);
            return Err(LifecycleError::Check {
                message,
                source: err,
            });
        }

        let destroyed = guard.release().map_err(LifecycleError::Destroy)?;
        tracing::info!("lifecycle complete");
        Ok(LifecycleReport {
            run_id,
            applied,
            destroyed,
        })
    }
}

fn release_with_note<R: CommandRunner, E: Display + ?Sized>(
    guard: DestroyGuard<'_, R>,
    err: &E,
) -> String {
    let teardown_error = guard.release().err();
    append_teardown_note(err.to_string(), teardown_error.as_ref())
}

fn append_teardown_note<E: Display>(message: String, teardown_error: Option<&E>) -> String {
    if let Some(teardown) = teardown_error {
        format!("{message} (teardown also failed: {teardown})")
    } else {
        message
    }
}
