//! Run configuration
//!
//! Everything a run needs is resolved once from the command line and then
//! handed down explicitly; nothing below reads or writes process-wide state.

use std::path::PathBuf;
use std::time::Duration;

/// Name of the sops binary looked up on `PATH` when no override is given.
pub const DEFAULT_SOPS_BIN: &str = "sops";

/// sops creation rules file that must exist in the working directory.
pub const SOPS_CONFIG_FILE: &str = ".sops.yaml";

/// Environment variable read by the AWS credential chain inside sops.
pub const PROFILE_ENV_VAR: &str = "AWS_PROFILE";

/// Upper bound for a single sops invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const INSTALL_HINT: &str = "Install with: brew install sops";

/// What a run does to the files it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    /// Report what `Encrypt` would do without touching any file.
    DryRun,
    Decrypt,
}

impl Mode {
    pub fn is_dry_run(self) -> bool {
        self == Mode::DryRun
    }
}

/// Immutable settings for one invocation of either tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub project: String,
    pub environment: String,
    pub profile: Option<String>,
    pub verbose: bool,
    pub mode: Mode,
    pub sops_bin: PathBuf,
    pub timeout: Duration,
}

impl RunConfig {
    /// `<project>/<environment>`, relative to the working directory.
    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.project).join(&self.environment)
    }
}
