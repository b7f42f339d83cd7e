//! CLI integration tests
//!
//! Runs `encrypt-files` and `decrypt-files` end-to-end against a fake `sops`
//! script that appends (or strips) a sops metadata block.

#![cfg(unix)]

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_SOPS: &str = r#"#!/bin/sh
case "$1" in
  -e)
    f="$3"
    case "$f" in *broken*) echo "Failed to get the data key" >&2; exit 1;; esac
    printf 'sops:\n    version: 3.7.1\n' >> "$f"
    ;;
  -d)
    f="$2"
    case "$f" in *broken*) echo "Failed to get the data key" >&2; exit 1;; esac
    grep -v -e '^sops:$' -e '^    version: 3.7.1$' "$f" || true
    ;;
  *)
    exit 2
    ;;
esac
"#;

/// A working directory with `.sops.yaml` and a fake sops on `PATH`.
struct Workspace {
    dir: TempDir,
    bin: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        fs::write(dir.path().join(".sops.yaml"), "creation_rules:\n  - kms: arn\n").unwrap();

        let sops = bin.path().join("sops");
        fs::write(&sops, FAKE_SOPS).unwrap();
        fs::set_permissions(&sops, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, bin }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    fn run(&self, bin: &str, args: &[&str]) -> Output {
        let mut paths = vec![self.bin.path().to_path_buf()];
        if let Some(existing) = env::var_os("PATH") {
            paths.extend(env::split_paths(&existing));
        }

        Command::new(bin)
            .args(args)
            .current_dir(self.dir.path())
            .env("PATH", env::join_paths(paths).unwrap())
            .env_remove("RUST_LOG")
            .env_remove("AWS_PROFILE")
            .env_remove("SOPSBATCH_SOPS_BIN")
            .env_remove("SOPSBATCH_TIMEOUT")
            .output()
            .unwrap()
    }

    fn encrypt(&self, args: &[&str]) -> Output {
        self.run(env!("CARGO_BIN_EXE_encrypt-files"), args)
    }

    fn decrypt(&self, args: &[&str]) -> Output {
        self.run(env!("CARGO_BIN_EXE_decrypt-files"), args)
    }

    fn snapshot(&self, relative: &str) -> Vec<(PathBuf, Vec<u8>)> {
        let mut entries = Vec::new();
        collect(&self.path(relative), &mut entries);
        entries.sort();
        entries
    }
}

fn collect(dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(&path, out);
        } else {
            let bytes = fs::read(&path).unwrap();
            out.push((path, bytes));
        }
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn error_lines(output: &Output) -> Vec<String> {
    stdout(output)
        .lines()
        .filter(|line| line.contains("ERROR"))
        .map(str::to_string)
        .collect()
}

fn example_dev() -> Workspace {
    let ws = Workspace::new();
    ws.write("example/dev/config.yaml", "database:\n  host: localhost\n");
    ws.write(
        "example/dev/secrets.env",
        "API_KEY=ENC[AES256_GCM,data:xyz]\nsops_version=3.7.1\n",
    );
    ws
}

#[test]
fn test_encrypt_scenario() {
    let ws = example_dev();

    let result = ws.encrypt(&["-v", "example", "dev"]);
    let out = stdout(&result);

    assert!(result.status.success(), "encrypt failed: {}", out);
    assert!(out.contains("Total files found: 2"), "{}", out);
    assert!(out.contains("Encrypted: 1"), "{}", out);
    assert!(out.contains("Already encrypted (skipped): 1"), "{}", out);
    assert!(error_lines(&result).is_empty());
    assert!(ws.read("example/dev/config.yaml").contains("\nsops:\n"));
}

#[test]
fn test_quiet_by_default() {
    let ws = example_dev();

    let result = ws.encrypt(&["example", "dev"]);

    assert!(result.status.success());
    assert_eq!(stdout(&result).trim(), "");
}

#[test]
fn test_second_encrypt_skips_everything() {
    let ws = example_dev();

    assert!(ws.encrypt(&["example", "dev"]).status.success());
    let after_first = ws.snapshot("example/dev");

    let result = ws.encrypt(&["-v", "example", "dev"]);
    let out = stdout(&result);

    assert!(result.status.success(), "{}", out);
    assert!(out.contains("Encrypted: 0"), "{}", out);
    assert!(out.contains("Already encrypted (skipped): 2"), "{}", out);
    assert_eq!(ws.snapshot("example/dev"), after_first);
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let ws = Workspace::new();
    let original_yaml = "service:\n  port: 8080\n";
    let original_json = "{\n  \"feature\": true\n}\n";
    ws.write("app/prod/service.yaml", original_yaml);
    ws.write("app/prod/nested/flags.json", original_json);

    let result = ws.encrypt(&["app", "prod"]);
    assert!(result.status.success(), "{}", stdout(&result));
    assert_ne!(ws.read("app/prod/service.yaml"), original_yaml);

    let result = ws.decrypt(&["-v", "app", "prod"]);
    let out = stdout(&result);
    assert!(result.status.success(), "decrypt failed: {}", out);
    assert!(out.contains("Decrypted: 2"), "{}", out);

    assert_eq!(ws.read("app/prod/service.yaml"), original_yaml);
    assert_eq!(ws.read("app/prod/nested/flags.json"), original_json);
}

#[test]
fn test_dry_run_changes_nothing() {
    let ws = example_dev();
    ws.write("example/dev/nested/.env", "DEBUG=1\n");
    let before = ws.snapshot("example/dev");

    let result = ws.encrypt(&["-n", "-v", "example", "dev"]);
    let out = stdout(&result);

    assert!(result.status.success(), "{}", out);
    assert!(out.contains("DRY RUN SUMMARY"), "{}", out);
    assert!(out.contains("Would encrypt: 2"), "{}", out);
    assert_eq!(ws.snapshot("example/dev"), before);
}

#[test]
fn test_decrypt_rejects_non_utf8_output() {
    let ws = Workspace::new();
    let sops = ws.bin.path().join("sops");
    fs::write(&sops, "#!/bin/sh\nprintf 'NAME=caf\\351\\n'\n").unwrap();
    let sealed = "NAME=ENC[AES256_GCM,data:xyz]\nsops_version=3.7.1\n";
    ws.write("p/e/s.env", sealed);

    let result = ws.decrypt(&["p", "e"]);
    let out = stdout(&result);

    assert_eq!(result.status.code(), Some(1));
    assert!(out.contains("not valid UTF-8"), "{}", out);
    assert_eq!(ws.read("p/e/s.env"), sealed);
}

#[test]
fn test_decrypt_missing_directory() {
    let ws = Workspace::new();

    let result = ws.decrypt(&["missing", "env"]);
    let errors = error_lines(&result);

    assert_eq!(result.status.code(), Some(1));
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("missing/env"), "{}", errors[0]);
}

#[test]
fn test_no_supported_files() {
    let ws = Workspace::new();
    ws.write("example/dev/notes.txt", "hello\n");
    ws.write("example/dev/settings.toml", "a = 1\n");

    let result = ws.encrypt(&["example", "dev"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stdout(&result).contains("No encryptable files found"));

    let result = ws.decrypt(&["example", "dev"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stdout(&result).contains("No decryptable files found"));
}

#[test]
fn test_failed_file_does_not_stop_run() {
    let ws = Workspace::new();
    ws.write("example/dev/a-broken.yaml", "a: 1\n");
    ws.write("example/dev/b.yaml", "b: 2\n");

    let result = ws.encrypt(&["example", "dev"]);
    let out = stdout(&result);

    assert_eq!(result.status.code(), Some(1));
    assert!(out.contains("Failed to get the data key"), "{}", out);
    assert!(out.contains("Errors: 1"), "{}", out);
    assert_eq!(ws.read("example/dev/a-broken.yaml"), "a: 1\n");
    assert!(ws.read("example/dev/b.yaml").contains("sops:"));
}

#[test]
fn test_missing_sops_config() {
    let ws = example_dev();
    fs::remove_file(ws.path(".sops.yaml")).unwrap();
    let before = ws.snapshot("example/dev");

    let result = ws.encrypt(&["example", "dev"]);

    assert_eq!(result.status.code(), Some(1));
    assert!(stdout(&result).contains(".sops.yaml not found"));
    assert_eq!(ws.snapshot("example/dev"), before);
}

#[test]
fn test_missing_sops_binary() {
    let ws = example_dev();

    let result = ws.decrypt(&["--sops-bin", "./not-installed/sops", "example", "dev"]);

    assert_eq!(result.status.code(), Some(1));
    assert!(stdout(&result).contains("command not found"));
}
