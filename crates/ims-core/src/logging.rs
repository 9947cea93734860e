//! Tracing setup for dashboard shells.

use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Use the RUST_LOG env var to control the level (e.g. `RUST_LOG=ims_core=debug`).
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}
