//! Command-line interface definitions for the `terraprobe` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `terraprobe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "terraprobe",
    about = "Apply a Terraform configuration and always destroy it again",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Initialise, apply, then destroy a configuration.
    #[command(name = "run", about = "Initialise, apply, then destroy a configuration")]
    Run(TargetArgs),
    /// Initialise and apply a configuration, leaving it in place.
    #[command(name = "apply", about = "Initialise and apply a configuration")]
    Apply(TargetArgs),
    /// Destroy everything provisioned from a configuration.
    #[command(name = "destroy", about = "Destroy everything provisioned from a configuration")]
    Destroy(TargetArgs),
}

/// Arguments shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    /// Directory holding the Terraform configuration.
    #[arg(value_name = "DIR", default_value = ".")]
    pub(crate) dir: String,
    /// Input variable passed to Terraform; may be repeated.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub(crate) vars: Vec<(String, String)>,
    /// Variable file passed to Terraform; may be repeated.
    #[arg(long = "var-file", value_name = "PATH")]
    pub(crate) var_files: Vec<String>,
}

/// Splits a `KEY=VALUE` pair, keeping any further `=` in the value.
pub(crate) fn parse_var(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got `{raw}`"));
    };
    if key.trim().is_empty() {
        return Err(format!("variable name must not be empty in `{raw}`"));
    }
    Ok((key.trim().to_owned(), value.to_owned()))
}
