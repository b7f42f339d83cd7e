//! Command-line interface shared by `encrypt-files` and `decrypt-files`

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use crate::config::{DEFAULT_SOPS_BIN, DEFAULT_TIMEOUT_SECS, Mode, RunConfig};

/// Arguments common to both tools.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Project name
    pub project: String,

    /// Environment name
    pub environment: String,

    /// AWS profile to use
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// sops binary to invoke
    #[arg(long, value_name = "PATH", env = "SOPSBATCH_SOPS_BIN", default_value = DEFAULT_SOPS_BIN)]
    pub sops_bin: PathBuf,

    /// Seconds to wait for a single sops invocation
    #[arg(
        long,
        value_name = "SECONDS",
        env = "SOPSBATCH_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

impl CommonArgs {
    fn into_config(self, mode: Mode) -> RunConfig {
        RunConfig {
            project: self.project,
            environment: self.environment,
            profile: self.profile,
            verbose: self.verbose,
            mode,
            sops_bin: self.sops_bin,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "encrypt-files")]
#[command(version)]
#[command(about = "Encrypt configuration files using SOPS and AWS KMS", long_about = None)]
#[command(after_help = "Examples:\n  encrypt-files example dev\n  encrypt-files -p my-profile example dev\n  encrypt-files -n example dev")]
pub struct EncryptCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Dry run - show what would be encrypted
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl EncryptCli {
    pub fn into_config(self) -> RunConfig {
        let mode = if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Encrypt
        };
        self.common.into_config(mode)
    }
}

#[derive(Parser, Debug)]
#[command(name = "decrypt-files")]
#[command(version)]
#[command(about = "Decrypt SOPS-encrypted files in-place", long_about = None)]
#[command(after_help = "Examples:\n  decrypt-files example dev\n  decrypt-files -p my-profile example dev\n  decrypt-files -v example dev")]
pub struct DecryptCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl DecryptCli {
    pub fn into_config(self) -> RunConfig {
        self.common.into_config(Mode::Decrypt)
    }
}
