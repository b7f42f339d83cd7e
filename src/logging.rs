//! Log output for both tools
//!
//! Everything is written to stdout. Without `--verbose` only warnings and
//! errors are shown; `RUST_LOG` overrides either default.

use std::io::{self, IsTerminal};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

/// Installs the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let ansi = io::stdout().is_terminal();
    colored::control::set_override(ansi);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(ansi)
        .with_target(false)
        .without_time();
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
