//! Tracing subscriber setup.

use std::io;
use tracing::Level;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, with `level` as
/// the default directive.
///
/// Safe to call more than once; later calls are no-ops once a global
/// subscriber exists.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}
