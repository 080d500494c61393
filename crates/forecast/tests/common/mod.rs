//! Common setup for forecast integration tests
//!
//! Each test gets a local source tree laid out like the NWS server and an
//! empty cache, both in temporary directories.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use forecast::ForecastAnalyzer;
use ndfd_common::{ForecastCycle, NdfdConfig};
use tempfile::TempDir;
use test_utils::fixtures::{write_source_elevation, write_source_variable};

/// Cycle matching the builder's default reference time (2024-03-14 12Z).
pub fn cycle() -> ForecastCycle {
    ForecastCycle::at(Utc.with_ymd_and_hms(2024, 3, 14, 12, 45, 0).unwrap())
}

pub struct TestSource {
    pub source: TempDir,
    pub cache: TempDir,
}

impl TestSource {
    pub fn new() -> Self {
        Self {
            source: tempfile::tempdir().unwrap(),
            cache: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> NdfdConfig {
        NdfdConfig::default()
            .with_source(self.source.path().to_string_lossy(), true)
            .with_cache_root(self.cache.path())
    }

    pub fn analyzer(&self) -> ForecastAnalyzer {
        ForecastAnalyzer::new(self.config()).unwrap()
    }

    /// Write the messages of one sub-resolution group.
    pub fn variable(&self, region: &str, period: &str, variable: &str, messages: &[Vec<u8>]) {
        write_source_variable(self.source.path(), region, period, variable, messages).unwrap();
    }

    /// Write both short and medium range groups.
    pub fn variable_groups(
        &self,
        region: &str,
        variable: &str,
        short_range: &[Vec<u8>],
        medium_range: &[Vec<u8>],
    ) {
        self.variable(region, "001-003", variable, short_range);
        self.variable(region, "004-007", variable, medium_range);
    }

    pub fn elevation(&self, region: &str, messages: &[Vec<u8>]) {
        write_source_elevation(self.source.path(), region, messages).unwrap();
    }
}
