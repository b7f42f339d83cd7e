//! AWS credential profile selection

use std::env;
use std::fmt;

use crate::config::PROFILE_ENV_VAR;

/// Which credentials sops will use when it talks to KMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialProfile {
    /// Named on the command line; exported to every sops child.
    Explicit(String),
    /// Already present in the environment and inherited unchanged.
    Inherited(String),
    /// Neither; sops falls back to the default credential chain.
    DefaultChain,
}

impl CredentialProfile {
    /// Applies the precedence: explicit flag, then existing variable, then default chain.
    ///
    /// Empty values count as unset, on the command line and in the environment.
    pub fn resolve(explicit: Option<&str>, inherited: Option<String>) -> Self {
        match (explicit, inherited) {
            (Some(name), _) if !name.is_empty() => Self::Explicit(name.to_string()),
            (None, Some(name)) if !name.is_empty() => Self::Inherited(name),
            _ => Self::DefaultChain,
        }
    }

    /// Resolves against the current process environment without modifying it.
    pub fn from_env(explicit: Option<&str>) -> Self {
        Self::resolve(explicit, env::var(PROFILE_ENV_VAR).ok())
    }

    /// The profile to pass to child processes, if one must be set explicitly.
    pub fn export(&self) -> Option<&str> {
        match self {
            Self::Explicit(name) => Some(name),
            Self::Inherited(_) | Self::DefaultChain => None,
        }
    }
}

impl fmt::Display for CredentialProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(name) => write!(f, "Using AWS profile: {}", name),
            Self::Inherited(name) => write!(f, "Using existing AWS profile: {}", name),
            Self::DefaultChain => write!(f, "Using default AWS credentials"),
        }
    }
}
