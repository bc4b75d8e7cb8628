//! Logging for the `tsid` binary.
//!
//! Events go to stderr so stdout carries only ids and conversions. The filter
//! comes from `RUST_LOG` and defaults to `info`; `RUST_LOG=tsid=trace` also
//! shows the generator's rollover and clock events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
