//! Configuration loading via `ortho-config`.
//!
//! Defaults, `terraprobe.toml` and `TERRAPROBE_*` environment variables are
//! merged into a [`TerraformConfig`], which then seeds the
//! [`TerraformOptions`] for a configuration directory.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::options::{
    DEFAULT_TERRAFORM_BIN, OptionsError, TerraformOptions, TerraformOptionsBuilder,
};

/// Terraform CLI settings shared by every run.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "TERRAPROBE",
    discovery(
        app_name = "terraprobe",
        env_var = "TERRAPROBE_CONFIG_PATH",
        config_file_name = "terraprobe.toml",
        dotfile_name = ".terraprobe.toml",
        project_file_name = "terraprobe.toml"
    )
)]
pub struct TerraformConfig {
    /// Path to the `terraform` executable.
    #[ortho_config(default = DEFAULT_TERRAFORM_BIN.to_owned())]
    pub terraform_bin: String,
    /// Whether to pass `-no-color` so logs stay free of escape codes.
    /// Unset means `true`.
    pub no_color: Option<bool>,
    /// Whether Terraform acquires the state lock. Unset means `true`.
    pub lock: Option<bool>,
    /// Optional lock acquisition timeout, for example `30s`.
    pub lock_timeout: Option<String>,
    /// Optional cap on concurrent resource operations.
    pub parallelism: Option<u32>,
    /// Whether `init` upgrades providers and modules.
    #[ortho_config(default = false)]
    pub upgrade: bool,
    /// Whether `init` discards any previously saved backend configuration.
    #[ortho_config(default = false)]
    pub reconfigure: bool,
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a configuration field holds an unusable value.
    #[error("invalid {field}: set {env_var} or add {field} to terraprobe.toml")]
    InvalidField {
        /// Field that failed validation.
        field: String,
        /// Environment variable that overrides the field.
        env_var: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Raised when the resulting options are unusable.
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl TerraformConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("terraprobe")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on configured values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the offending field and
    /// the environment variable that sets it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terraform_bin.trim().is_empty() {
            return Err(Self::invalid("terraform_bin"));
        }
        if self.parallelism == Some(0) {
            return Err(Self::invalid("parallelism"));
        }
        if self
            .lock_timeout
            .as_deref()
            .is_some_and(|timeout| timeout.trim().is_empty())
        {
            return Err(Self::invalid("lock_timeout"));
        }
        Ok(())
    }

    /// Starts an options builder for `terraform_dir` seeded with these
    /// settings, so callers can add variables before building.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when validation fails.
    pub fn options_builder(
        &self,
        terraform_dir: impl Into<Utf8PathBuf>,
    ) -> Result<TerraformOptionsBuilder, ConfigError> {
        self.validate()?;
        Ok(TerraformOptions::builder(terraform_dir)
            .terraform_bin(self.terraform_bin.trim())
            .no_color(self.no_color.unwrap_or(true))
            .lock(self.lock.unwrap_or(true))
            .lock_timeout(self.lock_timeout.clone())
            .parallelism(self.parallelism)
            .upgrade(self.upgrade)
            .reconfigure(self.reconfigure))
    }

    /// Builds validated options for `terraform_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings are invalid or the directory
    /// holds no usable configuration.
    pub fn options_for(
        &self,
        terraform_dir: impl Into<Utf8PathBuf>,
    ) -> Result<TerraformOptions, ConfigError> {
        let options = self.options_builder(terraform_dir)?.build();
        options.validate()?;
        Ok(options)
    }

    fn invalid(field: &str) -> ConfigError {
        ConfigError::InvalidField {
            field: field.to_owned(),
            env_var: format!("TERRAPROBE_{}", field.to_uppercase()),
        }
    }
}
