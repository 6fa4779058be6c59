//! Binary entry point for the `terraprobe` CLI.

use std::io::{self, Write};
use std::path;
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use terraprobe::{
    ConfigError, Lifecycle, LifecycleError, StreamingCommandRunner, Terraform, TerraformConfig,
    TerraformError, TerraformOptions,
};

mod cli;

use cli::{Cli, TargetArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Terraform(#[from] TerraformError),
    #[error("failed to resolve var file {path}: {message}")]
    VarFile { path: String, message: String },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let terraform = Terraform::new(StreamingCommandRunner);
    match cli {
        Cli::Run(args) => {
            let options = build_options(&args)?;
            let report = Lifecycle::new(terraform).run(&options)?;
            tracing::info!(
                run_id = %report.run_id,
                added = report.applied.map(|counts| counts.added),
                destroyed = report.destroyed.map(|counts| counts.destroyed),
                "terraform lifecycle passed"
            );
        }
        Cli::Apply(args) => {
            let options = build_options(&args)?;
            let summary = terraform.init_and_apply(&options)?;
            tracing::info!(
                added = summary.map(|counts| counts.added),
                "terraform apply passed"
            );
        }
        Cli::Destroy(args) => {
            let options = build_options(&args)?;
            let summary = terraform.destroy(&options)?;
            tracing::info!(
                destroyed = summary.map(|counts| counts.destroyed),
                "terraform destroy passed"
            );
        }
    }
    Ok(())
}

fn build_options(args: &TargetArgs) -> Result<TerraformOptions, CliError> {
    let config = TerraformConfig::load_without_cli_args()?;
    let builder = args
        .vars
        .iter()
        .fold(config.options_builder(args.dir.as_str())?, |acc, (key, value)| {
            acc.var(key.as_str(), value.as_str())
        });
    let options = args
        .var_files
        .iter()
        .map(|path| absolute_var_file(path.as_str()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .fold(builder, |acc, path| acc.var_file(path))
        .build();
    options.validate().map_err(ConfigError::from)?;
    Ok(options)
}

/// Anchors a `--var-file` path to the working directory. Terraform runs
/// under `-chdir`, where a relative path would name a file in the
/// configuration directory instead.
fn absolute_var_file(raw: &str) -> Result<Utf8PathBuf, CliError> {
    let failure = |message: String| CliError::VarFile {
        path: raw.to_owned(),
        message,
    };
    let resolved = path::absolute(raw).map_err(|err| failure(err.to_string()))?;
    Utf8PathBuf::from_path_buf(resolved)
        .map_err(|other| failure(format!("not valid UTF-8: {}", other.display())))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
