//! Apply a Terraform configuration and always destroy it again.
//!
//! The crate drives the external `terraform` binary through one lifecycle:
//! `init` and `apply` a configuration directory, optionally verify the live
//! infrastructure, then `destroy` it on every exit path. It is meant for
//! smoke tests of infrastructure code; planning and state management stay
//! inside Terraform.

pub mod config;
pub mod guard;
pub mod lifecycle;
pub mod options;
pub mod runner;
pub mod terraform;
pub mod test_support;

pub use config::{ConfigError, TerraformConfig};
pub use guard::DestroyGuard;
pub use lifecycle::{CheckError, Lifecycle, LifecycleError, LifecycleReport};
pub use options::{OptionsError, TerraformOptions, TerraformOptionsBuilder};
pub use runner::{
    CommandOutput, CommandRunner, ProcessCommandRunner, RunnerError, StreamingCommandRunner,
};
pub use terraform::{ChangeSummary, Terraform, TerraformError};
