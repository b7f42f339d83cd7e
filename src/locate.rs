//! Locating configuration files under a project/environment root

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ErrorCategory, ErrorKind, Result, SopsbatchError};

/// File name suffixes of the configuration formats sops handles for us.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".yaml", ".yml", ".json", ".env"];

/// True when the file name ends in one of [`SUPPORTED_EXTENSIONS`].
///
/// Matching is on the raw name bytes rather than [`Path::extension`] so that a
/// bare `.env` file and names that are not valid UTF-8 are picked up.
pub fn is_supported(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.as_encoded_bytes();
        SUPPORTED_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(ext.as_bytes()))
    })
}

/// Recursively collects supported regular files under `root`, sorted by path.
///
/// Symlinked files count when their target is a regular file; symlinked
/// directories are not descended into.
pub fn find_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(SopsbatchError::with_kind(
            ErrorCategory::User,
            ErrorKind::DirectoryNotFound,
            format!("Directory {} does not exist", root.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot list {}", e);
                continue;
            }
        };
        let path = entry.path();
        if is_supported(path) && path.is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
