//! Logging setup on `tracing-subscriber`.
//!
//! Log lines go to stderr so stdout stays free for JSON output.
//!
//! # Environment
//!
//! - `RUST_LOG`: filter directive (default `info`),
//!   e.g. `RUST_LOG=timetable_optimizer=debug`

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// # Example
/// ```no_run
/// use timetable_optimizer::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Debug-level subscriber for tests. Safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
