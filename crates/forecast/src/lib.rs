//! Point forecasts from National Digital Forecast Database grids.
//!
//! [`ForecastAnalyzer`] resolves a query to cached GRIB2 files, locates the
//! grid cell nearest the requested point and reports the value of each
//! valid time, optionally with statistics over a square neighborhood and
//! the terrain height beneath it. Weather and hazard grids are turned into
//! readable text.
//!
//! ```no_run
//! use forecast::{ForecastAnalyzer, ForecastQuery};
//! use ndfd_common::NdfdConfig;
//!
//! # async fn run() -> ndfd_common::NdfdResult<()> {
//! let analyzer = ForecastAnalyzer::new(NdfdConfig::from_env()?)?;
//! let result = analyzer
//!     .analyze_variable(&ForecastQuery::new("temp", 39.0483, -95.6780).with_neighborhood(1))
//!     .await?;
//! println!("{}", result.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod decoder;
pub mod locator;
pub mod query;
pub mod region;
pub mod stats;
pub mod types;
pub mod weather;

pub use analysis::ForecastAnalyzer;
pub use decoder::{Grib2FileDecoder, GridDecoder};
pub use locator::{nearest_grid_point, GridPoint};
pub use query::{ForecastQuery, WeatherQuery};
pub use region::{nearest_region, validate_arguments};
pub use stats::{median, std_dev, Statistics};
pub use types::{
    AnalysisResult, ElevationRecord, ForecastRecord, GridHeader, WeatherAnalysis, WeatherRecord,
};
