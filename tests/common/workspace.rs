//! Temporary Terraform workspaces for integration tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Single resource with no dependencies, mirroring `infra/main.tf`.
pub const SINGLE_RESOURCE: &str = "resource \"terraform_data\" \"probe\" {\n  input = \"terraprobe\"\n}\n";

/// A temporary directory holding a Terraform configuration under `infra/`.
pub struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Creates a workspace whose `infra/main.tf` holds `config`.
    pub fn with_config(config: &str) -> Self {
        let temp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temp dir should be utf8: {}", path.display()));
        let workspace = Self { _temp: temp, root };
        fs::create_dir_all(workspace.infra_dir())
            .unwrap_or_else(|err| panic!("create infra dir: {err}"));
        fs::write(workspace.infra_dir().join("main.tf"), config)
            .unwrap_or_else(|err| panic!("write main.tf: {err}"));
        workspace
    }

    /// Root of the temporary workspace.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding the Terraform configuration.
    pub fn infra_dir(&self) -> Utf8PathBuf {
        self.root().join("infra")
    }
}
