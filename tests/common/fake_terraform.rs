//! Scriptable stand-in for the `terraform` binary, installed into a
//! [`Workspace`](crate::workspace::Workspace).
//!
//! The script appends each invocation to `$FAKE_TF_LOG`, fails the
//! subcommand named by `$FAKE_TF_FAIL` and otherwise prints the completion
//! lines Terraform prints.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use camino::Utf8PathBuf;

use crate::workspace::Workspace;

const SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "$FAKE_TF_LOG"
sub="$2"
if [ "$sub" = "$FAKE_TF_FAIL" ]; then
  printf 'Error: Reference to undeclared input variable\n' >&2
  exit 1
fi
case "$sub" in
  init) printf 'Terraform has been successfully initialized!\n' ;;
  apply) printf 'Apply complete! Resources: 1 added, 0 changed, 0 destroyed.\n' ;;
  destroy) printf 'Destroy complete! Resources: 1 destroyed.\n' ;;
esac
exit 0
"#;

/// Writes the fake `terraform` script into the workspace root and returns
/// its path.
pub fn install(workspace: &Workspace) -> Utf8PathBuf {
    let path = workspace.root().join("terraform");
    fs::write(&path, SCRIPT).unwrap_or_else(|err| panic!("write fake terraform: {err}"));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|err| panic!("chmod fake terraform: {err}"));
    path
}

/// Path of the invocation log written by the fake binary.
pub fn log_path(workspace: &Workspace) -> Utf8PathBuf {
    workspace.root().join("terraform.log")
}

/// Full invocation log; empty when terraform never ran.
pub fn log(workspace: &Workspace) -> String {
    fs::read_to_string(log_path(workspace)).unwrap_or_default()
}

/// Subcommands recorded by the fake binary, in order.
pub fn logged_subcommands(workspace: &Workspace) -> Vec<String> {
    log(workspace)
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_owned)
        .collect()
}
