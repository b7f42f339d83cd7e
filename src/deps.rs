//! Dependency checks run before any file is touched

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::{INSTALL_HINT, SOPS_CONFIG_FILE};
use crate::error::{ErrorCategory, ErrorKind, Result, SopsbatchError};

/// Verifies that `program` can be executed and that `.sops.yaml` exists in `work_dir`.
///
/// Returns the resolved path of the binary. A failure has already been
/// logged, with an install hint when the binary is the missing piece.
pub fn check(program: &Path, work_dir: &Path) -> Result<PathBuf> {
    let resolved = require_program(program).inspect_err(|e| {
        tracing::error!("{}", e);
        tracing::info!("{}", INSTALL_HINT);
    })?;
    require_config(work_dir).inspect_err(|e| tracing::error!("{}", e))?;
    Ok(resolved)
}

/// Resolves `program` against `PATH`.
fn require_program(program: &Path) -> Result<PathBuf> {
    let path_var = env::var_os("PATH");
    find_program(program, path_var.as_deref()).ok_or_else(|| {
        SopsbatchError::with_kind(
            ErrorCategory::User,
            ErrorKind::MissingDependency,
            format!(
                "{} command not found. Please install sops first.",
                program.display()
            ),
        )
    })
}

/// Fails unless `.sops.yaml` exists in `work_dir`. Its content is left to sops.
fn require_config(work_dir: &Path) -> Result<()> {
    if !work_dir.join(SOPS_CONFIG_FILE).exists() {
        return Err(SopsbatchError::with_kind(
            ErrorCategory::User,
            ErrorKind::MissingDependency,
            format!("{} not found in current directory", SOPS_CONFIG_FILE),
        ));
    }
    Ok(())
}

/// Looks `program` up the way a shell would.
///
/// A name containing a path separator is checked as-is; a bare name is
/// searched for in every entry of `path_var`.
pub fn find_program(program: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let path_var = path_var?;
    env::split_paths(path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
