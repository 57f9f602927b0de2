//! Logging initialization for the daemon.
//!
//! All tracing output goes to stderr in the standard fmt layout. The
//! domain-visible run log (`sync-run-log`) is a separate append-only
//! store; this module only covers the ambient tracing subscriber.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Log level comes from `RUST_LOG` when set, otherwise from the provided
/// default. Safe to call once per process; later calls are ignored.
///
/// # Example
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("sync starting");
/// ```
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
