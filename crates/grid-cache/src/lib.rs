//! Local cache of NDFD grid files.
//!
//! [`CacheManager`] turns a (variable, region) pair into local GRIB2 files
//! for the active forecast cycle, fetching missing files through a
//! [`Fetcher`]. [`SourceFetcher`] is the production transport: HTTP from
//! the NWS distribution server or a mirror, or a copy from a local
//! directory.

pub mod fetch;
pub mod manager;

pub use fetch::{partial_path, FetchError, FetchTarget, Fetcher, SourceFetcher};
pub use manager::{elevation_path, variable_path, CacheManager};
