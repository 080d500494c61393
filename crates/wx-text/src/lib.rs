//! NDFD weather and hazard strings.
//!
//! `wx` and `wwa` grids store an index per cell into a list of code
//! strings packed 7 bits per character into the message's local use
//! section. This crate unpacks that list and turns individual codes into
//! readable phrases.

pub mod advisory;
mod case;
pub mod packed;
pub mod weather;

pub use advisory::parse_advisory;
pub use packed::unpack_codes;
pub use weather::{parse_weather, WeatherEvent, NO_WEATHER};
