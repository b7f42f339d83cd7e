//! Batch processing of a project/environment tree
//!
//! Files are handled one at a time in path order. A failure on one file is
//! logged and counted, and the run moves on to the next file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::config::{Mode, RunConfig};
use crate::credentials::CredentialProfile;
use crate::deps;
use crate::detect::{self, FileState};
use crate::error::{ErrorCategory, ErrorKind, Result, SopsbatchError};
use crate::locate;
use crate::report;
use crate::sops::{SopsCli, SopsTool};
use crate::stats::{Outcome, RunStats};

/// Runs one tool invocation from the current directory and returns whether it succeeded.
pub fn run(config: &RunConfig) -> bool {
    run_in(config, Path::new(""))
}

/// Like [`run`], with `.sops.yaml` and the project root resolved against `work_dir`.
///
/// Succeeds only when sops and `.sops.yaml` are present, the root exists and
/// holds at least one supported file, and no file failed.
pub fn run_in(config: &RunConfig, work_dir: &Path) -> bool {
    let Ok(program) = deps::check(&config.sops_bin, work_dir) else {
        return false;
    };

    let profile = CredentialProfile::from_env(config.profile.as_deref());
    tracing::info!("{}", profile);
    let tool = SopsCli::new(program, config.timeout, profile);

    let root = work_dir.join(config.root());
    let action = match config.mode {
        Mode::Encrypt | Mode::DryRun => "encryption",
        Mode::Decrypt => "decryption",
    };
    tracing::info!("Starting {} process for {}", action, root.display());

    match process(&root, config.mode, &tool) {
        Ok(stats) => report::report(&stats, config.mode),
        Err(e) if e.is(ErrorKind::NoFilesFound) => {
            tracing::warn!("{}", e);
            false
        }
        Err(e) => {
            tracing::error!("{}", e);
            false
        }
    }
}

/// Processes every supported file under `root`.
///
/// Only a missing root or an empty tree is an error; per-file problems are
/// counted in the returned statistics.
pub fn process(root: &Path, mode: Mode, tool: &dyn SopsTool) -> Result<RunStats> {
    let files = locate::find_files(root)?;
    if files.is_empty() {
        let adjective = match mode {
            Mode::Encrypt | Mode::DryRun => "encryptable",
            Mode::Decrypt => "decryptable",
        };
        return Err(SopsbatchError::with_kind(
            ErrorCategory::User,
            ErrorKind::NoFilesFound,
            format!("No {} files found in {}", adjective, root.display()),
        ));
    }

    if mode.is_dry_run() {
        tracing::info!("🔍 DRY RUN MODE - showing what would be encrypted:");
    }

    let mut stats = RunStats::new(files.len());
    for path in &files {
        let outcome = match mode {
            Mode::Encrypt | Mode::DryRun => encrypt_one(path, mode.is_dry_run(), tool),
            Mode::Decrypt => decrypt_one(path, tool),
        };
        stats.record(outcome);
    }
    debug_assert!(stats.is_complete());
    Ok(stats)
}

fn encrypt_one(path: &Path, dry_run: bool, tool: &dyn SopsTool) -> Outcome {
    match detect::detect(path) {
        FileState::Encrypted => {
            tracing::info!("⏭️ SKIP (already encrypted): {}", path.display());
            return Outcome::Skipped;
        }
        FileState::Unreadable => {
            tracing::info!("⏭️ SKIP (unreadable): {}", path.display());
            return Outcome::Skipped;
        }
        FileState::Plaintext => {}
    }

    if dry_run {
        tracing::info!("🔒 WOULD ENCRYPT: {}", path.display());
        return Outcome::Processed;
    }

    tracing::info!("Encrypting: {}", path.display());
    match tool.encrypt_in_place(path) {
        Ok(()) => {
            tracing::info!("Successfully encrypted: {}", path.display());
            Outcome::Processed
        }
        Err(e) => {
            tracing::error!("{}", e);
            Outcome::Failed
        }
    }
}

fn decrypt_one(path: &Path, tool: &dyn SopsTool) -> Outcome {
    match detect::detect(path) {
        FileState::Encrypted => {}
        FileState::Plaintext | FileState::Unreadable => {
            tracing::info!("⏭️ SKIP (not encrypted): {}", path.display());
            return Outcome::Skipped;
        }
    }

    tracing::info!("Decrypting: {}", path.display());
    let result = tool
        .decrypt(path)
        .and_then(|content| overwrite(path, content.as_bytes()));
    match result {
        Ok(()) => {
            tracing::info!("Successfully decrypted: {}", path.display());
            Outcome::Processed
        }
        Err(e) => {
            tracing::error!("{}", e);
            Outcome::Failed
        }
    }
}

/// Replaces the content of an existing file, keeping its permissions.
fn overwrite(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |e: io::Error| {
        SopsbatchError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::WriteFailure,
            format!("Failed writing {}: {}", path.display(), e),
            e,
        )
    };

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    Ok(())
}
