//! Static NDFD code tables.
//!
//! - [`regions`]: grid areas, their centers and the variables each
//!   sub-resolution group publishes
//! - [`weather`]: coverage, intensity, weather type, hazard, attribute and
//!   visibility codes found in `wx` strings
//! - [`advisory`]: hazard phenomena and significance codes found in `wwa`
//!   strings

pub mod advisory;
pub mod regions;
pub mod weather;

pub use regions::{find_region, Region, VariableGroup, REGIONS};
