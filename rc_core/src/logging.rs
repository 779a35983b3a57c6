//! # Logging
//!
//! The engine reports solver branches, range substitutions and infeasible
//! outcomes through `tracing`. Nothing is printed unless the host installs
//! a subscriber; these helpers install the usual one.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a formatted subscriber filtered by `RUST_LOG` (default: `info`).
///
/// # Example
/// ```no_run
/// rc_core::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Install a debug-level subscriber writing through the test harness.
///
/// Safe to call from many tests; only the first call installs.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
