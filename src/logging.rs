//! Diagnostic tracing for the operator binary.
//!
//! Tracing output is for diagnosing the process itself. Operator-facing
//! lifecycle events go through the notification sink, which is independent
//! of `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Initialises the global tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to `default_filter`. Output goes to stderr
/// in compact format. Calling this more than once is harmless: later calls
/// leave the first subscriber in place.
///
/// # Example
/// ```bash
/// RUST_LOG=branchwarden=debug branchwarden run
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed, e.g. by a test harness.
    let _already_set = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .is_err();
}
