//! Structured logging for station runs.
//!
//! The engine logs admissions, rejections and service completions at `debug`
//! and queue entries at `trace`. `RUST_LOG` overrides the level passed in,
//! e.g. `RUST_LOG=queue_station::queues::station=trace`.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Does nothing if one is already set, so
/// tests and embedding applications can call it freely.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!(level, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging("debug");
        init_logging("warn");
        tracing::debug!("still logging");
    }
}
