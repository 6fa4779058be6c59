//! Shared fixtures for lifecycle BDD scenarios.

use std::rc::Rc;

use camino::Utf8PathBuf;
use rstest::fixture;
use tempfile::TempDir;
use terraprobe::test_support::ScriptedRunner;
use terraprobe::{LifecycleError, LifecycleReport, TerraformOptions};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureStage {
    Options,
    Apply,
    Check,
    Destroy,
}

impl FailureStage {
    pub fn of(err: &LifecycleError) -> Self {
        match err {
            LifecycleError::Options(_) => Self::Options,
            LifecycleError::Apply { .. } => Self::Apply,
            LifecycleError::Check { .. } => Self::Check,
            LifecycleError::Destroy(_) => Self::Destroy,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "options" => Some(Self::Options),
            "apply" => Some(Self::Apply),
            "check" => Some(Self::Check),
            "destroy" => Some(Self::Destroy),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum LifecycleOutcome {
    Success(LifecycleReport),
    Failure { stage: FailureStage, message: String },
}

#[derive(Clone, Debug)]
pub struct LifecycleContext {
    pub _temp: Rc<TempDir>,
    pub dir: Utf8PathBuf,
    pub runner: ScriptedRunner,
    pub outcome: Option<LifecycleOutcome>,
}

impl LifecycleContext {
    pub fn options(&self) -> TerraformOptions {
        TerraformOptions::builder(self.dir.clone()).build()
    }
}

#[fixture]
pub fn lifecycle_context() -> LifecycleContext {
    let temp = TempDir::new().unwrap_or_else(|err| panic!("temp dir should be created: {err}"));
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp dir should be utf8: {}", path.display()));
    LifecycleContext {
        _temp: Rc::new(temp),
        dir,
        runner: ScriptedRunner::new(),
        outcome: None,
    }
}

/// Lines printed by `terraform state list` for `count` resources.
pub fn state_listing(count: u32) -> String {
    (0..count).fold(String::new(), |mut acc, index| {
        acc.push_str(&format!("terraform_data.probe[{index}]\n"));
        acc
    })
}
