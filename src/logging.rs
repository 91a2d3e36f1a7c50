//! Logging setup for the command-line front end.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary. `RUST_LOG` takes precedence over the level chosen from the
//! command line:
//!
//! ```bash
//! RUST_LOG=zipserve=trace zipserve site.zip -r /index.html
//! ```

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact stderr subscriber at `level` for this crate.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zipserve={level}")));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
