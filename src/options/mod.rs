//! Terraform invocation options.
//!
//! [`TerraformOptions`] is the configuration handle passed to every
//! Terraform operation. It names the configuration directory and carries the
//! handful of CLI knobs a smoke test needs (variables, locking, colour). The
//! directory is checked before any command runs so a typo fails fast instead
//! of surfacing as an opaque Terraform error.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Default Terraform binary name.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

/// Environment applied to every Terraform command so it never prompts and
/// keeps its output terse.
pub const AUTOMATION_ENV: [(&str, &str); 2] = [("TF_IN_AUTOMATION", "1"), ("TF_INPUT", "0")];

/// Errors raised when options do not describe a usable configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OptionsError {
    /// Raised when a required string value is blank.
    #[error("invalid terraform options: {field} must not be empty")]
    Blank {
        /// Option that failed validation.
        field: String,
    },
    /// Raised when the configuration directory is missing.
    #[error("terraform configuration directory not found: {path}")]
    MissingDirectory {
        /// Directory that was expected to exist.
        path: Utf8PathBuf,
    },
    /// Raised when the directory cannot be read.
    #[error("failed to read terraform configuration directory {path}: {message}")]
    Unreadable {
        /// Directory that could not be listed.
        path: Utf8PathBuf,
        /// Underlying I/O error message.
        message: String,
    },
    /// Raised when the directory holds no `.tf` or `.tf.json` files.
    #[error("no terraform configuration files (*.tf, *.tf.json) in {path}")]
    NoConfiguration {
        /// Directory that was inspected.
        path: Utf8PathBuf,
    },
    /// Raised when parallelism is set to zero.
    #[error("invalid terraform options: parallelism must be at least 1")]
    ZeroParallelism,
}

/// Options describing how to run Terraform against one directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerraformOptions {
    terraform_dir: Utf8PathBuf,
    terraform_bin: String,
    vars: BTreeMap<String, String>,
    var_files: Vec<Utf8PathBuf>,
    env_vars: BTreeMap<String, String>,
    no_color: bool,
    lock: bool,
    lock_timeout: Option<String>,
    parallelism: Option<u32>,
    upgrade: bool,
    reconfigure: bool,
}

impl TerraformOptions {
    /// Starts a builder for the given configuration directory.
    #[must_use]
    pub fn builder(terraform_dir: impl Into<Utf8PathBuf>) -> TerraformOptionsBuilder {
        TerraformOptionsBuilder::new(terraform_dir)
    }

    /// Directory holding the Terraform configuration.
    #[must_use]
    pub fn terraform_dir(&self) -> &Utf8Path {
        &self.terraform_dir
    }

    /// Terraform executable invoked for every command.
    #[must_use]
    pub fn terraform_bin(&self) -> &str {
        &self.terraform_bin
    }

    /// Input variables passed with `-var`.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Variable files passed with `-var-file`.
    #[must_use]
    pub fn var_files(&self) -> &[Utf8PathBuf] {
        &self.var_files
    }

    /// Whether `-no-color` is passed.
    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.no_color
    }

    /// Whether state locking is enabled.
    #[must_use]
    pub const fn lock(&self) -> bool {
        self.lock
    }

    /// Lock acquisition timeout, for example `30s`.
    #[must_use]
    pub fn lock_timeout(&self) -> Option<&str> {
        self.lock_timeout.as_deref()
    }

    /// Maximum number of concurrent resource operations.
    #[must_use]
    pub const fn parallelism(&self) -> Option<u32> {
        self.parallelism
    }

    /// Whether `init` upgrades providers and modules.
    #[must_use]
    pub const fn upgrade(&self) -> bool {
        self.upgrade
    }

    /// Whether `init` ignores any previously saved backend configuration.
    #[must_use]
    pub const fn reconfigure(&self) -> bool {
        self.reconfigure
    }

    /// Environment for Terraform commands: the automation defaults followed by
    /// caller-supplied variables, which win on conflict.
    #[must_use]
    pub fn command_env(&self) -> Vec<(String, String)> {
        let mut merged: BTreeMap<String, String> = AUTOMATION_ENV
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        merged.extend(
            self.env_vars
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        merged.into_iter().collect()
    }

    /// Checks that the options describe an existing configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] when the binary or lock timeout is blank,
    /// parallelism is zero, or the directory is missing, unreadable, or has no
    /// configuration files.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.terraform_bin.trim().is_empty() {
            return Err(OptionsError::Blank {
                field: String::from("terraform_bin"),
            });
        }
        if self.terraform_dir.as_str().trim().is_empty() {
            return Err(OptionsError::Blank {
                field: String::from("terraform_dir"),
            });
        }
        if self.parallelism == Some(0) {
            return Err(OptionsError::ZeroParallelism);
        }
        if self
            .lock_timeout
            .as_deref()
            .is_some_and(|timeout| timeout.trim().is_empty())
        {
            return Err(OptionsError::Blank {
                field: String::from("lock_timeout"),
            });
        }
        if !self.terraform_dir.is_dir() {
            return Err(OptionsError::MissingDirectory {
                path: self.terraform_dir.clone(),
            });
        }
        if !contains_configuration(&self.terraform_dir)? {
            return Err(OptionsError::NoConfiguration {
                path: self.terraform_dir.clone(),
            });
        }
        Ok(())
    }
}

fn contains_configuration(path: &Utf8Path) -> Result<bool, OptionsError> {
    let unreadable = |err: std::io::Error| OptionsError::Unreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(unreadable)?;
    for entry in dir.entries().map_err(unreadable)? {
        let item = entry.map_err(unreadable)?;
        if !item.file_type().map_err(unreadable)?.is_file() {
            continue;
        }
        let name = item.file_name().map_err(unreadable)?;
        if is_configuration_file(&name) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_configuration_file(name: &str) -> bool {
    Utf8Path::new(name)
        .extension()
        .is_some_and(|ext| ext == "tf")
        || name.ends_with(".tf.json")
}

/// Builder for [`TerraformOptions`]. Validation happens in
/// [`TerraformOptions::validate`] so options can be assembled before the
/// directory exists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerraformOptionsBuilder {
    options: TerraformOptions,
}

impl TerraformOptionsBuilder {
    /// Creates a builder with the default binary, colour disabled and
    /// locking enabled.
    #[must_use]
    pub fn new(terraform_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            options: TerraformOptions {
                terraform_dir: terraform_dir.into(),
                terraform_bin: DEFAULT_TERRAFORM_BIN.to_owned(),
                vars: BTreeMap::new(),
                var_files: Vec::new(),
                env_vars: BTreeMap::new(),
                no_color: true,
                lock: true,
                lock_timeout: None,
                parallelism: None,
                upgrade: false,
                reconfigure: false,
            },
        }
    }

    /// Sets the Terraform executable.
    #[must_use]
    pub fn terraform_bin(mut self, value: impl Into<String>) -> Self {
        self.options.terraform_bin = value.into();
        self
    }

    /// Adds an input variable.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.vars.insert(key.into(), value.into());
        self
    }

    /// Adds a variable file.
    ///
    /// Commands run with `-chdir`, so Terraform resolves a relative path
    /// against the configuration directory, not the caller's working
    /// directory.
    #[must_use]
    pub fn var_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.options.var_files.push(path.into());
        self
    }

    /// Adds an environment variable for every Terraform command.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.env_vars.insert(key.into(), value.into());
        self
    }

    /// Toggles `-no-color`.
    #[must_use]
    pub const fn no_color(mut self, value: bool) -> Self {
        self.options.no_color = value;
        self
    }

    /// Toggles state locking.
    #[must_use]
    pub const fn lock(mut self, value: bool) -> Self {
        self.options.lock = value;
        self
    }

    /// Sets the lock acquisition timeout.
    #[must_use]
    pub fn lock_timeout(mut self, value: Option<String>) -> Self {
        self.options.lock_timeout = value;
        self
    }

    /// Sets the apply/destroy parallelism.
    #[must_use]
    pub const fn parallelism(mut self, value: Option<u32>) -> Self {
        self.options.parallelism = value;
        self
    }

    /// Toggles `init -upgrade`.
    #[must_use]
    pub const fn upgrade(mut self, value: bool) -> Self {
        self.options.upgrade = value;
        self
    }

    /// Toggles `init -reconfigure`.
    #[must_use]
    pub const fn reconfigure(mut self, value: bool) -> Self {
        self.options.reconfigure = value;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> TerraformOptions {
        self.options
    }
}
