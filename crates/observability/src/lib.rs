//! Process-wide tracing/logging setup for planning binaries.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize tracing with the format named by `KITCHENPLAN_LOG_FORMAT`
/// (`json`, the default, or `pretty`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
