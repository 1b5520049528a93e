//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(debug: bool) -> &'static str {
    if debug { "debug" } else { "warn" }
}

/// Initialize logging to stderr
///
/// stdout carries only the rendered map, so log output never goes there.
pub fn init_logging(debug: bool, ansi: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(debug)
        .try_init();
}
