//! Tracing subscriber setup for the CLI.

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "REPO_PULSE_LOG";

static INIT: Once = Once::new();

/// Default filter for the given `-v` count and `--quiet` flag.
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "repo_pulse=error";
    }
    match verbosity {
        0 => "repo_pulse=warn",
        1 => "repo_pulse=info",
        2 => "repo_pulse=debug",
        _ => "repo_pulse=trace",
    }
}

/// Installs the stderr subscriber once.
///
/// `REPO_PULSE_LOG` (e.g. `REPO_PULSE_LOG=repo_pulse::score=debug`) wins over
/// the verbosity flags when it parses.
pub fn init(verbosity: u8, quiet: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(verbosity > 1),
            )
            .with(filter)
            .init();
    });
}
