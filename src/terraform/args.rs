//! Argument vectors for each Terraform subcommand.

use std::ffi::OsString;

use crate::options::TerraformOptions;

/// Global `-chdir` flag followed by the subcommand name.
fn subcommand(options: &TerraformOptions, name: &str) -> Vec<OsString> {
    vec![
        OsString::from(format!("-chdir={}", options.terraform_dir())),
        OsString::from(name),
    ]
}

fn push_lock_args(args: &mut Vec<OsString>, options: &TerraformOptions) {
    args.push(OsString::from(format!("-lock={}", options.lock())));
    if let Some(timeout) = options.lock_timeout() {
        args.push(OsString::from(format!("-lock-timeout={timeout}")));
    }
}

fn push_no_color(args: &mut Vec<OsString>, options: &TerraformOptions) {
    if options.no_color() {
        args.push(OsString::from("-no-color"));
    }
}

/// Flags shared by `apply` and `destroy`: non-interactive approval, locking,
/// parallelism and input variables.
fn push_mutation_args(args: &mut Vec<OsString>, options: &TerraformOptions) {
    args.push(OsString::from("-input=false"));
    args.push(OsString::from("-auto-approve"));
    push_lock_args(args, options);
    if let Some(parallelism) = options.parallelism() {
        args.push(OsString::from(format!("-parallelism={parallelism}")));
    }
    for (key, value) in options.vars() {
        args.push(OsString::from("-var"));
        args.push(OsString::from(format!("{key}={value}")));
    }
    for file in options.var_files() {
        args.push(OsString::from(format!("-var-file={file}")));
    }
    push_no_color(args, options);
}

pub(crate) fn init_args(options: &TerraformOptions) -> Vec<OsString> {
    let mut args = subcommand(options, "init");
    args.push(OsString::from(format!("-upgrade={}", options.upgrade())));
    args.push(OsString::from("-input=false"));
    if options.reconfigure() {
        args.push(OsString::from("-reconfigure"));
    }
    push_lock_args(&mut args, options);
    push_no_color(&mut args, options);
    args
}

pub(crate) fn apply_args(options: &TerraformOptions) -> Vec<OsString> {
    let mut args = subcommand(options, "apply");
    push_mutation_args(&mut args, options);
    args
}

pub(crate) fn destroy_args(options: &TerraformOptions) -> Vec<OsString> {
    let mut args = subcommand(options, "destroy");
    push_mutation_args(&mut args, options);
    args
}

pub(crate) fn state_list_args(options: &TerraformOptions) -> Vec<OsString> {
    let mut args = subcommand(options, "state");
    args.push(OsString::from("list"));
    args
}

pub(crate) fn output_args(options: &TerraformOptions, name: &str) -> Vec<OsString> {
    let mut args = subcommand(options, "output");
    args.push(OsString::from("-json"));
    push_no_color(&mut args, options);
    args.push(OsString::from(name));
    args
}
