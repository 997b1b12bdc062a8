//! Process-wide tracing setup shared by binaries and tests.

/// Subscriber configuration (filters, output format).
pub mod subscriber;

pub use subscriber::DEFAULT_FILTER;

/// Initialize process-wide logging: JSON lines, filtered by `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init_json(DEFAULT_FILTER);
}

/// Human-readable logging captured by the test harness.
pub fn init_for_tests() {
    subscriber::init_test();
}
