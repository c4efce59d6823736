//! Logging setup.
//!
//! Everything logs through the `tracing` macros re-exported from
//! [`prelude`]. The daemon calls [`init_journald_or_stdout`] once at
//! startup.

use std::env;

use tracing_subscriber::{EnvFilter, fmt, fmt::time::LocalTime, prelude::*};

pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
}

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Under systemd (`JOURNAL_STREAM` is set for services whose stdout is
/// connected to the journal) logs go straight to journald. Otherwise, or
/// if the journal socket can't be opened, they go to stdout with local
/// timestamps.
pub fn init_journald_or_stdout() {
    if env::var_os("JOURNAL_STREAM").is_some() {
        match tracing_journald::layer() {
            Ok(journald) => {
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(journald)
                    .init();
                return;
            }
            Err(e) => {
                eprintln!("journald unavailable ({e}), logging to stdout");
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_timer(LocalTime::rfc_3339()))
        .init();
}
