//! Tracing setup for hosts embedding the renderer
//!
//! Configure via the RUST_LOG environment variable:
//! - `RUST_LOG=verselight=debug` - pipeline and cache decisions
//! - `RUST_LOG=trace` - per-asset cache hits and resolver detail

use tracing_subscriber::EnvFilter;

/// Initialize a console subscriber honoring RUST_LOG, defaulting to `warn`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
