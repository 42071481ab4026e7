//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide logging with `default_filter` unless `RUST_LOG` is set.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(default_filter: &str) {
    tracing::init_with(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
