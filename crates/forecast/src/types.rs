//! Analysis results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndfd_common::{NdfdError, NdfdResult};
use serde::Serialize;

use crate::stats::Statistics;

/// Grid metadata captured from the first matching message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridHeader {
    /// Centre of the nearest cell
    pub grid_lat: f64,
    pub grid_lon: f64,
    /// Cell size in metres
    pub delta_x: f64,
    pub delta_y: f64,
    pub units: String,
    /// Geodesic distance in metres from the query point to the cell centre
    pub distance: f64,
}

/// Value at one valid time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub nearest: f64,
    /// Present when the neighborhood holds more than one cell
    pub stats: Option<Statistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationRecord {
    pub nearest: f64,
    pub units: String,
    pub stats: Option<Statistics>,
}

/// Point forecast of one variable over every matching valid time.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub variable: String,
    pub lat: f64,
    pub lon: f64,
    pub neighborhood: i32,
    pub region: String,
    pub cycle: DateTime<Utc>,
    pub header: Option<GridHeader>,
    pub forecasts: BTreeMap<DateTime<Utc>, ForecastRecord>,
    pub elevation: Option<ElevationRecord>,
    /// Statistics over every sample of every valid time
    pub stats: Statistics,
}

impl AnalysisResult {
    /// JSON rendering; NaN values become `null`.
    pub fn to_json(&self) -> NdfdResult<String> {
        to_json(self)
    }
}

/// Weather and hazard text at one valid time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub wx_string: String,
    pub weather_string: String,
    /// Statute miles, NaN when no visibility is forecast
    pub visibility: f64,
    pub wwa_string: String,
    pub advisory_string: String,
}

impl Default for WeatherRecord {
    fn default() -> Self {
        Self {
            wx_string: String::new(),
            weather_string: String::new(),
            visibility: f64::NAN,
            wwa_string: String::new(),
            advisory_string: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherAnalysis {
    pub lat: f64,
    pub lon: f64,
    pub region: String,
    pub cycle: DateTime<Utc>,
    pub header: Option<GridHeader>,
    pub forecasts: BTreeMap<DateTime<Utc>, WeatherRecord>,
}

impl WeatherAnalysis {
    pub fn to_json(&self) -> NdfdResult<String> {
        to_json(self)
    }
}

fn to_json<T: Serialize>(value: &T) -> NdfdResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| NdfdError::Decode(format!("Failed to serialize result: {}", e)))
}
