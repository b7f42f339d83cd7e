//! End-of-run summary

use colored::Colorize;

use crate::config::Mode;
use crate::stats::RunStats;

/// Level a summary line is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub severity: Severity,
    pub text: String,
}

impl SummaryLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

struct Wording {
    heading: &'static str,
    processed: &'static str,
    skipped: &'static str,
    failure_hint: &'static str,
    done: &'static str,
}

fn wording(mode: Mode) -> Wording {
    match mode {
        Mode::Encrypt => Wording {
            heading: "ENCRYPTION SUMMARY:",
            processed: "Encrypted",
            skipped: "Already encrypted (skipped)",
            failure_hint: "Some files failed to encrypt. Check your AWS credentials and .sops.yaml configuration.",
            done: "Encryption completed successfully",
        },
        Mode::DryRun => Wording {
            heading: "DRY RUN SUMMARY:",
            processed: "Would encrypt",
            skipped: "Already encrypted (skipped)",
            failure_hint: "Some files failed to encrypt. Check your AWS credentials and .sops.yaml configuration.",
            done: "Dry run completed successfully",
        },
        Mode::Decrypt => Wording {
            heading: "DECRYPTION SUMMARY:",
            processed: "Decrypted",
            skipped: "Not encrypted (skipped)",
            failure_hint: "Some files failed to decrypt. Check your AWS credentials and .sops.yaml configuration.",
            done: "Decryption completed successfully",
        },
    }
}

/// Builds the summary for `stats`. Errors are only mentioned when there were any.
pub fn render(stats: &RunStats, mode: Mode) -> Vec<SummaryLine> {
    let words = wording(mode);
    let mut lines = vec![
        SummaryLine::info(format!("📊 {}", words.heading.bold())),
        SummaryLine::info(format!("   Total files found: {}", stats.total_files)),
        SummaryLine::info(format!(
            "   {}: {}",
            words.processed,
            stats.processed_files.to_string().green()
        )),
    ];
    if stats.error_files > 0 {
        lines.push(SummaryLine::error(format!(
            "   Errors: {}",
            stats.error_files.to_string().red()
        )));
    }
    lines.push(SummaryLine::info(format!(
        "   {}: {}",
        words.skipped,
        stats.skipped_files.to_string().yellow()
    )));

    if stats.is_success() {
        lines.push(SummaryLine::info(format!("✅ {}", words.done)));
    } else {
        lines.push(SummaryLine::error(words.failure_hint));
    }
    lines
}

/// Logs the summary and returns whether the run succeeded.
pub fn report(stats: &RunStats, mode: Mode) -> bool {
    for line in render(stats, mode) {
        match line.severity {
            Severity::Info => tracing::info!("{}", line.text),
            Severity::Error => tracing::error!("{}", line.text),
        }
    }
    stats.is_success()
}
