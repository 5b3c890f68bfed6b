//! Stderr logging for the CLI.
//!
//! Level comes from `CHATFOLD_LOG` (full `EnvFilter` syntax, e.g.
//! `chatfold_engine=debug`) or, when unset, from `--log-level`.

use crate::types::LogLevel;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub const LOG_ENV: &str = "CHATFOLD_LOG";

/// Install the global subscriber. Later calls are no-ops.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
