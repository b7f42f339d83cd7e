//! Invoking the sops binary
//!
//! All cryptography happens inside sops. This module only runs it, one file
//! at a time, and turns its exit status into a [`Result`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::PROFILE_ENV_VAR;
use crate::credentials::CredentialProfile;
use crate::error::{ErrorCategory, ErrorKind, Result, SopsbatchError};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Operations the batch loops need from an encryption tool.
pub trait SopsTool {
    /// Decrypts `path` and returns the plaintext. The file itself is not modified.
    ///
    /// Output that is not valid UTF-8 is an error, never a lossy conversion.
    fn decrypt(&self, path: &Path) -> Result<String>;

    /// Encrypts `path` in place.
    fn encrypt_in_place(&self, path: &Path) -> Result<()>;
}

/// Runs a sops-compatible binary as a subprocess.
#[derive(Debug, Clone)]
pub struct SopsCli {
    program: PathBuf,
    timeout: Duration,
    profile: CredentialProfile,
}

/// Captured result of one finished invocation.
#[derive(Debug)]
struct Finished {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl SopsCli {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration, profile: CredentialProfile) -> Self {
        Self {
            program: program.into(),
            timeout,
            profile,
        }
    }

    fn command(&self, args: &[&str], path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(profile) = self.profile.export() {
            cmd.env(PROFILE_ENV_VAR, profile);
        }
        cmd
    }

    /// Runs sops with `args` against `path` and fails on timeout or non-zero exit.
    fn run(&self, action: &str, args: &[&str], path: &Path) -> Result<Vec<u8>> {
        let child = self.command(args, path).spawn().map_err(|e| {
            SopsbatchError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::ExternalToolFailure,
                format!(
                    "Error {} {}: failed to run {}: {}",
                    action,
                    path.display(),
                    self.program.display(),
                    e
                ),
                e,
            )
        })?;

        let finished = wait_with_timeout(child, self.timeout)
            .map_err(|e| e.with_context(format!("Error {} {}", action, path.display())))?
            .ok_or_else(|| {
                SopsbatchError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::ExternalToolTimeout,
                    format!(
                        "Timeout {} {} after {}s",
                        action,
                        path.display(),
                        self.timeout.as_secs()
                    ),
                )
            })?;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            return Err(SopsbatchError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::ExternalToolFailure,
                format!(
                    "Failed {} {} ({}): {}",
                    action,
                    path.display(),
                    finished.status,
                    stderr.trim()
                ),
            ));
        }

        Ok(finished.stdout)
    }
}

impl SopsTool for SopsCli {
    fn decrypt(&self, path: &Path) -> Result<String> {
        let stdout = self.run("decrypting", &["-d"], path)?;
        String::from_utf8(stdout).map_err(|e| {
            SopsbatchError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::ExternalToolFailure,
                format!("Error decrypting {}: output is not valid UTF-8", path.display()),
                e,
            )
        })
    }

    fn encrypt_in_place(&self, path: &Path) -> Result<()> {
        self.run("encrypting", &["-e", "-i"], path)?;
        Ok(())
    }
}

/// Waits for `child` for at most `timeout`, draining both pipes meanwhile.
///
/// Returns `Ok(None)` after killing the child if the deadline passed.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<Option<Finished>> {
    let stdout = child.stdout.take().map(drain_stdout);
    let stderr = child.stderr.take().map(drain_stderr);
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait().map_err(wait_error)? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Some(Finished {
        status,
        stdout: join_pipe(stdout),
        stderr: join_pipe(stderr),
    }))
}

fn drain_stdout(mut pipe: ChildStdout) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn drain_stderr(mut pipe: ChildStderr) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_pipe(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn wait_error(e: std::io::Error) -> SopsbatchError {
    SopsbatchError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::Io,
        "failed to wait for sops",
        e,
    )
}
