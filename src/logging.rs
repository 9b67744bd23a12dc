//! Logging setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (from `LOG_LEVEL`) applies to
/// this crate and warnings only to everything else. Calling it twice is a
/// no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))));

    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
