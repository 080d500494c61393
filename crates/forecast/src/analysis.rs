//! Point forecast analysis over cached NDFD grids.

use std::collections::BTreeMap;

use grib2_parser::Grib2Message;
use grid_cache::{CacheManager, Fetcher, SourceFetcher};
use ndfd_common::{ForecastCycle, NdfdConfig, NdfdError, NdfdResult};
use projection::Geodesic;
use tracing::{debug, info, instrument};

use crate::decoder::{decode_error, Grib2FileDecoder, GridDecoder};
use crate::locator::{cell_size, collect_window, mask_missing, nearest_grid_point, GridPoint};
use crate::query::ForecastQuery;
use crate::region::{nearest_region, validate_arguments};
use crate::stats::Statistics;
use crate::types::{AnalysisResult, ElevationRecord, ForecastRecord, GridHeader};

/// Answers forecast queries from locally cached grids.
///
/// Grids are fetched into the cache on demand. Each query runs
/// sequentially; the analyzer holds no per-query state.
pub struct ForecastAnalyzer<D = Grib2FileDecoder, F = SourceFetcher> {
    pub(crate) cache: CacheManager<F>,
    pub(crate) decoder: D,
}

impl ForecastAnalyzer {
    /// Analyzer with the production fetcher and GRIB2 decoder.
    pub fn new(config: NdfdConfig) -> NdfdResult<Self> {
        let decoder = Grib2FileDecoder::new(config.decode_timeout());
        let cache = CacheManager::new(config)?;
        Ok(Self { cache, decoder })
    }
}

impl<D: GridDecoder, F: Fetcher> ForecastAnalyzer<D, F> {
    pub fn with_parts(cache: CacheManager<F>, decoder: D) -> Self {
        Self { cache, decoder }
    }

    pub fn cache(&self) -> &CacheManager<F> {
        &self.cache
    }

    /// Forecast of `query.variable` at a point for the current cycle.
    pub async fn analyze_variable(&self, query: &ForecastQuery) -> NdfdResult<AnalysisResult> {
        self.analyze_variable_for_cycle(query, ForecastCycle::current())
            .await
    }

    /// Forecast of `query.variable` at a point for `cycle`.
    ///
    /// Every message of the variable's files whose valid time is one of the
    /// cycle's candidate times contributes a [`ForecastRecord`] built from
    /// the neighborhood around the nearest cell. A later message with the
    /// same valid time replaces the earlier record; its samples still count
    /// towards the overall statistics.
    #[instrument(
        skip(self, query),
        fields(variable = %query.variable, lat = query.lat, lon = query.lon, cycle = %cycle)
    )]
    pub async fn analyze_variable_for_cycle(
        &self,
        query: &ForecastQuery,
        cycle: ForecastCycle,
    ) -> NdfdResult<AnalysisResult> {
        if query.neighborhood < 0 {
            return Err(NdfdError::InvalidNeighborhood(query.neighborhood));
        }
        let region = select_region(query.region.as_deref(), query.lat, query.lon);
        validate_arguments(&query.variable, &region, query.time_step_hours)?;

        let valid_times = cycle.valid_times(query.time_step_hours, query.min_time, query.max_time);
        let paths = self
            .cache
            .resolve_for_cycle(&query.variable, &region, cycle)
            .await?;

        let radius = query.neighborhood as i64;
        let mut header = None;
        let mut elevation = None;
        let mut elevation_pending = query.include_elevation;
        let mut forecasts = BTreeMap::new();
        let mut samples = Vec::new();

        for path in &paths {
            for message in self.decoder.open(path).await? {
                let valid_time = message.valid_time().map_err(decode_error)?;
                if !valid_times.contains(&valid_time) {
                    continue;
                }

                let point = nearest_grid_point(&message, query.lat, query.lon, None)?;
                if header.is_none() {
                    header = Some(grid_header(&message, &point, query.lat, query.lon)?);
                }

                let window = self.read_window(&message, &point, radius).await?;
                debug!(valid_time = %valid_time, x = point.x, y = point.y, "Sampled message");

                if elevation_pending {
                    elevation_pending = false;
                    let record = self
                        .elevation(&region, &message, query.lat, query.lon, radius)
                        .await?;
                    elevation = Some(record);
                }

                forecasts.insert(
                    valid_time,
                    ForecastRecord {
                        nearest: center(&window, radius),
                        stats: neighborhood_stats(&window),
                    },
                );
                samples.extend(window);
            }
        }

        info!(
            region = %region,
            files = paths.len(),
            valid_times = forecasts.len(),
            samples = samples.len(),
            "Variable analysis complete"
        );

        Ok(AnalysisResult {
            variable: query.variable.clone(),
            lat: query.lat,
            lon: query.lon,
            neighborhood: query.neighborhood,
            region,
            cycle: cycle.time(),
            header,
            forecasts,
            elevation,
            stats: Statistics::from_values(&samples),
        })
    }

    /// Decoded, masked neighborhood around `point`.
    pub(crate) async fn read_window(
        &self,
        message: &Grib2Message,
        point: &GridPoint,
        radius: i64,
    ) -> NdfdResult<Vec<f64>> {
        let values = self.decoder.values(message).await?;
        let (nj, ni) = message.grid_dims();
        let missing = message.missing_value();
        let window = collect_window(&values, ni as usize, nj as usize, point.x, point.y, radius)?;
        Ok(window.into_iter().map(|v| mask_missing(v, missing)).collect())
    }

    /// Terrain height around the point, indexed on the forecast grid's
    /// projection.
    async fn elevation(
        &self,
        region: &str,
        primary: &Grib2Message,
        lat: f64,
        lon: f64,
        radius: i64,
    ) -> NdfdResult<ElevationRecord> {
        let path = self.cache.resolve_static(region).await?;
        let message = self
            .decoder
            .open(&path)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| NdfdError::Decode(format!("No grid in {}", path.display())))?;

        let params = primary.projection_params().map_err(decode_error)?;
        let point = nearest_grid_point(&message, lat, lon, Some(&params))?;
        let window = self.read_window(&message, &point, radius).await?;

        Ok(ElevationRecord {
            nearest: center(&window, radius),
            units: message.units().to_string(),
            stats: neighborhood_stats(&window),
        })
    }
}

/// Requested region, or the nearest one to the point.
pub(crate) fn select_region(requested: Option<&str>, lat: f64, lon: f64) -> String {
    match requested {
        Some(region) => region.to_string(),
        None => {
            let region = nearest_region(lat, lon);
            debug!(region, "Selected nearest region");
            region.to_string()
        }
    }
}

pub(crate) fn grid_header(
    message: &Grib2Message,
    point: &GridPoint,
    lat: f64,
    lon: f64,
) -> NdfdResult<GridHeader> {
    let (delta_x, delta_y) = cell_size(&message.spacing())?;
    Ok(GridHeader {
        grid_lat: point.lat,
        grid_lon: point.lon,
        delta_x,
        delta_y,
        units: message.units().to_string(),
        distance: Geodesic::default().distance(lat, lon, point.lat, point.lon),
    })
}

/// Nearest-cell value of a window built by [`collect_window`].
fn center(window: &[f64], radius: i64) -> f64 {
    let side = 2 * radius + 1;
    window
        .get((radius * side + radius) as usize)
        .copied()
        .unwrap_or(f64::NAN)
}

fn neighborhood_stats(window: &[f64]) -> Option<Statistics> {
    (window.len() > 1).then(|| Statistics::from_values(window))
}
