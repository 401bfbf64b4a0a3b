//! Tracing and logging (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(debug: bool) {
    tracing::init(debug);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
