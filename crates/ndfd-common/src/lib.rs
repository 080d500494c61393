//! Common types and utilities shared across the NDFD forecast crates.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod time;

pub use config::{NdfdConfig, SourceConfig, DEFAULT_REMOTE_URL};
pub use error::{NdfdError, NdfdResult};
pub use time::{ForecastCycle, ValidTimes, CACHE_SERVER_BUFFER_MIN};
