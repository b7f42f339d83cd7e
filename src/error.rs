use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum, including failures reported by sops itself.
    Internal,

    /// The user pointed the tool at something that does not exist or is
    /// not set up (missing binary, missing `.sops.yaml`, missing directory).
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The sops binary or the `.sops.yaml` configuration is absent.
    MissingDependency,
    /// The `<project>/<environment>` root does not exist.
    DirectoryNotFound,
    /// The root exists but contains no supported configuration files.
    NoFilesFound,
    /// A candidate file could not be read for marker detection.
    FileUnreadable,
    /// sops could not be spawned or exited with a non-zero status.
    ExternalToolFailure,
    /// sops did not finish within the configured timeout.
    ExternalToolTimeout,
    /// Decrypted content could not be written back to the file.
    WriteFailure,
    /// Any other interaction with the filesystem or a pipe failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SopsbatchError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST
    /// handle the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SopsbatchError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// True when the error was tagged with `kind`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == Some(kind)
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SopsbatchError>;
