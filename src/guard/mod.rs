//! Scoped release of provisioned infrastructure.
//!
//! A [`DestroyGuard`] is armed before `apply` runs. Whatever happens next
//! (normal return, early error return, or a panic unwinding the stack) the
//! guard runs `terraform destroy` exactly once.

use crate::options::TerraformOptions;
use crate::runner::CommandRunner;
use crate::terraform::{ChangeSummary, Terraform, TerraformError};

/// Runs `terraform destroy` when released or dropped.
///
/// Prefer [`DestroyGuard::release`] on the normal path so a destroy failure
/// is returned to the caller. When the guard is dropped while still armed it
/// destroys from `Drop`, where errors cannot be returned.
///
/// # Panics
///
/// Dropping an armed guard panics if destroy fails and the thread is not
/// already panicking, so a test using the guard still fails. During
/// unwinding the failure is only logged, since a second panic would abort.
#[must_use = "dropping the guard immediately destroys the infrastructure"]
#[derive(Debug)]
pub struct DestroyGuard<'a, R: CommandRunner> {
    terraform: &'a Terraform<R>,
    options: &'a TerraformOptions,
    armed: bool,
}

impl<'a, R: CommandRunner> DestroyGuard<'a, R> {
    /// Arms a guard for the given configuration.
    pub const fn new(terraform: &'a Terraform<R>, options: &'a TerraformOptions) -> Self {
        Self {
            terraform,
            options,
            armed: true,
        }
    }

    /// Runs destroy now and disarms the guard.
    ///
    /// # Errors
    ///
    /// Returns the [`TerraformError`] raised by destroy.
    pub fn release(mut self) -> Result<Option<ChangeSummary>, TerraformError> {
        self.armed = false;
        self.destroy()
    }

    /// Disarms the guard without destroying anything.
    ///
    /// Used when provisioned infrastructure must outlive the current scope.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    fn destroy(&self) -> Result<Option<ChangeSummary>, TerraformError> {
        tracing::info!(dir = %self.options.terraform_dir(), "destroying terraform resources");
        let result = self.terraform.destroy(self.options);
        match &result {
            Ok(summary) => tracing::info!(
                destroyed = summary.map(|counts| counts.destroyed),
                "terraform destroy finished"
            ),
            Err(err) => tracing::error!(error = %err, "terraform destroy failed"),
        }
        result
    }
}

impl<R: CommandRunner> Drop for DestroyGuard<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        let unwinding = std::thread::panicking();
        if unwinding {
            tracing::warn!("destroying terraform resources while unwinding from a panic");
        }
        if let Err(err) = self.destroy()
            && !unwinding
        {
            panic!("terraform destroy failed during scoped release: {err}");
        }
    }
}
