//! sopsbatch - batch encryption and decryption of configuration files with sops
//!
//! The crate walks a `<project>/<environment>` tree, decides per file whether
//! sops has already encrypted it, and runs the sops binary on the files that
//! need it. No cryptography happens here.

#![forbid(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod deps;
pub mod detect;
pub mod error;
pub mod locate;
pub mod logging;
pub mod report;
pub mod sops;
pub mod stats;
