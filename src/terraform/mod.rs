//! Thin client over the Terraform CLI.
//!
//! [`Terraform`] renders argument vectors for `init`, `apply`, `destroy`,
//! `state list` and `output`, runs them through a [`CommandRunner`], and maps
//! non-zero exits to [`TerraformError::CommandFailure`]. Plan and apply
//! semantics stay inside the CLI; this module only drives it.

use std::ffi::OsString;

use thiserror::Error;

use crate::options::{OptionsError, TerraformOptions};
use crate::runner::{
    CommandOutput, CommandRunner, ProcessCommandRunner, RunnerError, render_command_line,
};

mod args;
mod summary;

pub use summary::{ChangeSummary, parse_change_summary};

/// Errors surfaced while driving the Terraform CLI.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TerraformError {
    /// Raised when the options do not describe a usable configuration.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// Raised when the Terraform process cannot be started.
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// Raised when a Terraform subcommand exits with a non-zero status.
    #[error("terraform {subcommand} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Subcommand that failed, for example `apply`.
        subcommand: String,
        /// Exit status as reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the process, trimmed.
        stderr: String,
    },
    /// Raised when machine-readable output cannot be parsed.
    #[error("failed to parse terraform {subcommand} output: {message}")]
    Parse {
        /// Subcommand whose output was parsed.
        subcommand: String,
        /// Parser error message.
        message: String,
    },
}

/// Drives the Terraform CLI through a command runner.
#[derive(Clone, Debug)]
pub struct Terraform<R: CommandRunner> {
    runner: R,
}

impl Terraform<ProcessCommandRunner> {
    /// Creates a client wired to the real process runner.
    #[must_use]
    pub const fn with_process_runner() -> Self {
        Self::new(ProcessCommandRunner)
    }
}

impl<R: CommandRunner> Terraform<R> {
    /// Creates a client using the provided runner.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs `terraform init` in the configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError`] when validation fails, the process cannot
    /// start, or init exits non-zero.
    pub fn init(&self, options: &TerraformOptions) -> Result<(), TerraformError> {
        options.validate()?;
        self.execute(options, "init", &args::init_args(options))?;
        Ok(())
    }

    /// Runs `terraform apply -auto-approve` and returns the reported resource
    /// counts when Terraform printed them.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError`] when validation fails, the process cannot
    /// start, or apply exits non-zero.
    pub fn apply(&self, options: &TerraformOptions) -> Result<Option<ChangeSummary>, TerraformError> {
        options.validate()?;
        let output = self.execute(options, "apply", &args::apply_args(options))?;
        Ok(parse_change_summary(&output.stdout))
    }

    /// Runs `init` followed by `apply`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`TerraformError`] raised by either step.
    pub fn init_and_apply(
        &self,
        options: &TerraformOptions,
    ) -> Result<Option<ChangeSummary>, TerraformError> {
        self.init(options)?;
        self.apply(options)
    }

    /// Runs `terraform destroy -auto-approve`.
    ///
    /// Destroying a directory with nothing provisioned succeeds and reports
    /// zero destroyed resources.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError`] when validation fails, the process cannot
    /// start, or destroy exits non-zero.
    pub fn destroy(
        &self,
        options: &TerraformOptions,
    ) -> Result<Option<ChangeSummary>, TerraformError> {
        options.validate()?;
        let output = self.execute(options, "destroy", &args::destroy_args(options))?;
        Ok(parse_change_summary(&output.stdout))
    }

    /// Lists the addresses of resources currently recorded in state.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError`] when validation fails, the process cannot
    /// start, or `state list` exits non-zero.
    pub fn state_list(&self, options: &TerraformOptions) -> Result<Vec<String>, TerraformError> {
        options.validate()?;
        let output = self.execute(options, "state list", &args::state_list_args(options))?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Reads a single root module output as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::Parse`] when the output is not valid JSON,
    /// or any other [`TerraformError`] when the command fails.
    pub fn output_json(
        &self,
        options: &TerraformOptions,
        name: &str,
    ) -> Result<serde_json::Value, TerraformError> {
        options.validate()?;
        let output = self.execute(options, "output", &args::output_args(options, name))?;
        serde_json::from_str(&output.stdout).map_err(|err| TerraformError::Parse {
            subcommand: String::from("output"),
            message: err.to_string(),
        })
    }

    fn execute(
        &self,
        options: &TerraformOptions,
        subcommand: &str,
        args: &[OsString],
    ) -> Result<CommandOutput, TerraformError> {
        let program = options.terraform_bin();
        tracing::debug!(
            command = %render_command_line(program, args),
            "running terraform {subcommand}"
        );

        let output = self.runner.run(program, args, &options.command_env())?;
        if output.is_success() {
            tracing::debug!(subcommand = subcommand, "terraform command succeeded");
            return Ok(output);
        }

        let status_text = output.status_text();
        tracing::warn!(subcommand = subcommand, status = %status_text, "terraform command failed");
        Err(TerraformError::CommandFailure {
            subcommand: subcommand.to_owned(),
            status: output.code,
            status_text,
            stderr: output.stderr.trim().to_owned(),
        })
    }
}
