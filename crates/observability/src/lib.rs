//! Tracing and logging setup shared by the storefront binaries.

/// Initialize process-wide tracing with the default `info` level.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing configuration (filters, output format).
pub mod tracing;
