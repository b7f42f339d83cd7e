//! Detection of files that sops has already encrypted
//!
//! sops leaves a metadata block in every file it encrypts. We look for the
//! textual traces of that block instead of parsing the file, which works the
//! same way for YAML, JSON and dotenv.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::RegexSet;

use crate::error::{ErrorCategory, ErrorKind, Result, SopsbatchError};

/// Markers sops writes into encrypted files, matched per line.
pub const SOPS_MARKERS: [&str; 5] = [
    // YAML: top-level `sops:` key
    r"(?m)^sops:",
    // JSON: `"sops":` key
    r#"(?m)"sops":"#,
    // dotenv: `sops_*` metadata keys
    r"(?m)^sops_",
    r"(?m)sops_version=",
    r"(?m)sops_mac=",
];

static MARKERS: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(SOPS_MARKERS).expect("sops marker patterns are valid"));

/// Encryption state of a single file at the time it was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Encrypted,
    Plaintext,
    /// The file could not be read; callers treat it as not encrypted.
    Unreadable,
}

/// True if any line of `content` carries a sops marker.
pub fn is_encrypted_content(content: &str) -> bool {
    MARKERS.is_match(content)
}

/// Reads `path` and classifies it.
///
/// Invalid UTF-8 is replaced rather than rejected. Read failures are logged
/// as warnings and reported as [`FileState::Unreadable`].
pub fn detect(path: &Path) -> FileState {
    match read_lossy(path) {
        Ok(content) if is_encrypted_content(&content) => FileState::Encrypted,
        Ok(_) => FileState::Plaintext,
        Err(e) => {
            tracing::warn!("{}", e);
            FileState::Unreadable
        }
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        SopsbatchError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::FileUnreadable,
            format!("Cannot read file {}: {}", path.display(), e),
            e,
        )
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
