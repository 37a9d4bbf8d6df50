//! Tracing setup: a single `init_logging` entry point, `RUST_LOG`/
//! `SKELLY_LOG` controls verbosity, a `--debug` CLI flag raises the
//! default filter.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call once at
/// process start; subsequent calls are no-ops.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("SKELLY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
