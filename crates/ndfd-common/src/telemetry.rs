//! Tracing subscriber setup for applications embedding the forecast crates.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedding application's call.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{NdfdError, NdfdResult};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. With `json`
/// the output is one JSON object per event.
pub fn init_tracing(default_level: Level, json: bool) -> NdfdResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let builder = fmt().with_env_filter(filter).with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| NdfdError::Configuration(format!("Failed to set tracing subscriber: {}", e)))
}
