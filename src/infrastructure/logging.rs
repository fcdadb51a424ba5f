//! Logging configuration
//!
//! Initializes tracing for the application. Logs go to stderr so command
//! output on stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, fmt};

/// Picks the log level from the global flags
///
/// `--verbose` wins over `--silent`; with neither, `configured` is used.
#[must_use]
pub fn log_level(verbose: bool, silent: bool, configured: &str) -> &str {
    if verbose {
        "debug"
    } else if silent {
        "error"
    } else {
        configured
    }
}

/// Initializes logging with the specified level
///
/// `RUST_LOG`, when set, takes precedence over `level`. Returns false if a
/// subscriber was already installed.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .try_init()
        .is_ok()
}
