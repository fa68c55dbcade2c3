//! Process-wide tracing setup.
//!
//! Per-day telemetry (total length, unimpeded increment, applied scale) is
//! logged at `info`; engine internals at `debug`. `RUST_LOG` overrides the
//! default filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber: stderr, compact format, `info` unless
/// `RUST_LOG` says otherwise.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
