//! Tracing/logging initialization.
//!
//! Production runs emit JSON lines; debug runs emit human-readable output at
//! `debug` level. `RUST_LOG` overrides the default filter in both modes.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = if debug {
        builder.with_target(true).try_init()
    } else {
        builder.json().with_target(false).try_init()
    };
}
