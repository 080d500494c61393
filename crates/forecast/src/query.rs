//! Query builders.
//!
//! ```rust
//! use forecast::{ForecastQuery, WeatherQuery};
//!
//! // 2-cell neighborhood of apparent temperature every 3 hours
//! let query = ForecastQuery::new("apt", 39.0483, -95.6780)
//!     .with_neighborhood(2)
//!     .with_time_step(3)
//!     .with_elevation();
//!
//! // Weather and hazards for a fixed region
//! let query = WeatherQuery::new(21.3069, -157.8583).in_region("hawaii");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point forecast of one NDFD variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    /// NDFD variable name (e.g., "temp", "apt", "qpf")
    pub variable: String,
    pub lat: f64,
    pub lon: f64,
    /// Radius in cells of the square window around the nearest cell
    pub neighborhood: i32,
    pub time_step_hours: u32,
    pub include_elevation: bool,
    /// Earliest valid time considered (inclusive)
    pub min_time: Option<DateTime<Utc>>,
    /// Latest valid time considered (inclusive)
    pub max_time: Option<DateTime<Utc>>,
    /// Grid area; the nearest area is chosen when absent
    pub region: Option<String>,
}

impl ForecastQuery {
    pub fn new(variable: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            variable: variable.into(),
            lat,
            lon,
            neighborhood: 0,
            time_step_hours: 1,
            include_elevation: false,
            min_time: None,
            max_time: None,
            region: None,
        }
    }

    pub fn with_neighborhood(mut self, radius: i32) -> Self {
        self.neighborhood = radius;
        self
    }

    pub fn with_time_step(mut self, hours: u32) -> Self {
        self.time_step_hours = hours;
        self
    }

    pub fn with_elevation(mut self) -> Self {
        self.include_elevation = true;
        self
    }

    pub fn with_min_time(mut self, time: DateTime<Utc>) -> Self {
        self.min_time = Some(time);
        self
    }

    pub fn with_max_time(mut self, time: DateTime<Utc>) -> Self {
        self.max_time = Some(time);
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Weather and hazard text at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub time_step_hours: u32,
    pub min_time: Option<DateTime<Utc>>,
    pub max_time: Option<DateTime<Utc>>,
    pub region: Option<String>,
}

impl WeatherQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            time_step_hours: 1,
            min_time: None,
            max_time: None,
            region: None,
        }
    }

    pub fn with_time_step(mut self, hours: u32) -> Self {
        self.time_step_hours = hours;
        self
    }

    pub fn with_min_time(mut self, time: DateTime<Utc>) -> Self {
        self.min_time = Some(time);
        self
    }

    pub fn with_max_time(mut self, time: DateTime<Utc>) -> Self {
        self.max_time = Some(time);
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_defaults() {
        let query = ForecastQuery::new("temp", 40.0, -100.0);
        assert_eq!(query.neighborhood, 0);
        assert_eq!(query.time_step_hours, 1);
        assert!(!query.include_elevation);
        assert!(query.region.is_none());
    }

    #[test]
    fn test_forecast_deserializes_from_json() {
        let query: ForecastQuery = serde_json::from_str(
            r#"{"variable":"qpf","lat":40.0,"lon":-100.0,"neighborhood":1,
                "time_step_hours":6,"include_elevation":true,
                "min_time":"2024-03-14T18:00:00Z","max_time":null,"region":"crplains"}"#,
        )
        .unwrap();
        assert_eq!(
            query,
            ForecastQuery::new("qpf", 40.0, -100.0)
                .with_neighborhood(1)
                .with_time_step(6)
                .with_elevation()
                .with_min_time("2024-03-14T18:00:00Z".parse().unwrap())
                .in_region("crplains")
        );
    }
}
