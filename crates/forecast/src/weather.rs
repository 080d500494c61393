//! Weather (`wx`) and hazard (`wwa`) text at a point.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use grid_cache::Fetcher;
use ndfd_common::{ForecastCycle, NdfdError, NdfdResult, ValidTimes};
use tracing::{debug, info, instrument, warn};
use wx_text::{parse_advisory, parse_weather, unpack_codes};

use crate::analysis::{grid_header, select_region, ForecastAnalyzer};
use crate::decoder::{decode_error, GridDecoder};
use crate::locator::nearest_grid_point;
use crate::query::WeatherQuery;
use crate::region::validate_arguments;
use crate::types::{GridHeader, WeatherAnalysis, WeatherRecord};

const WEATHER_VARIABLE: &str = "wx";
const HAZARD_VARIABLE: &str = "wwa";

/// Code string selected by the nearest cell of one message.
struct CellCode {
    valid_time: DateTime<Utc>,
    code: Option<String>,
}

impl<D: GridDecoder, F: Fetcher> ForecastAnalyzer<D, F> {
    /// Weather and hazard text at a point for the current cycle.
    pub async fn analyze_weather(&self, query: &WeatherQuery) -> NdfdResult<WeatherAnalysis> {
        self.analyze_weather_for_cycle(query, ForecastCycle::current())
            .await
    }

    /// Weather and hazard text at a point for `cycle`.
    ///
    /// `wx` grids fill the weather fields of each record, then `wwa` grids
    /// fill the hazard fields, adding records for times only `wwa` covers.
    #[instrument(skip(self, query), fields(lat = query.lat, lon = query.lon, cycle = %cycle))]
    pub async fn analyze_weather_for_cycle(
        &self,
        query: &WeatherQuery,
        cycle: ForecastCycle,
    ) -> NdfdResult<WeatherAnalysis> {
        let region = select_region(query.region.as_deref(), query.lat, query.lon);
        validate_arguments(WEATHER_VARIABLE, &region, query.time_step_hours)?;
        let valid_times = cycle.valid_times(query.time_step_hours, query.min_time, query.max_time);

        let mut header = None;
        let mut forecasts: BTreeMap<DateTime<Utc>, WeatherRecord> = BTreeMap::new();

        for cell in self
            .read_codes(WEATHER_VARIABLE, &region, cycle, &valid_times, query, &mut header)
            .await?
        {
            let record = forecasts.entry(cell.valid_time).or_default();
            if let Some(code) = cell.code {
                let (text, visibility) = parse_weather(&code);
                record.weather_string = text;
                record.visibility = visibility;
                record.wx_string = code;
            }
        }

        for cell in self
            .read_codes(HAZARD_VARIABLE, &region, cycle, &valid_times, query, &mut header)
            .await?
        {
            let record = forecasts.entry(cell.valid_time).or_default();
            if let Some(code) = cell.code {
                record.advisory_string = parse_advisory(&code);
                record.wwa_string = code;
            }
        }

        info!(region = %region, valid_times = forecasts.len(), "Weather analysis complete");

        Ok(WeatherAnalysis {
            lat: query.lat,
            lon: query.lon,
            region,
            cycle: cycle.time(),
            header,
            forecasts,
        })
    }

    /// Nearest-cell code of every `variable` message at a candidate time.
    async fn read_codes(
        &self,
        variable: &str,
        region: &str,
        cycle: ForecastCycle,
        valid_times: &ValidTimes,
        query: &WeatherQuery,
        header: &mut Option<GridHeader>,
    ) -> NdfdResult<Vec<CellCode>> {
        let mut cells = Vec::new();

        for path in self.cache.resolve_for_cycle(variable, region, cycle).await? {
            for message in self.decoder.open(&path).await? {
                let valid_time = message.valid_time().map_err(decode_error)?;
                if !valid_times.contains(&valid_time) {
                    continue;
                }

                let local_use = message.local_use.clone().ok_or_else(|| {
                    NdfdError::Decode(format!(
                        "{} message at {} has no local use section",
                        variable, valid_time
                    ))
                })?;

                let point = nearest_grid_point(&message, query.lat, query.lon, None)?;
                if header.is_none() {
                    *header = Some(grid_header(&message, &point, query.lat, query.lon)?);
                }

                let value = self
                    .read_window(&message, &point, 0)
                    .await?
                    .first()
                    .copied()
                    .unwrap_or(f64::NAN);

                let code = if value.is_nan() {
                    None
                } else if value < 0.0 || value.fract() != 0.0 {
                    warn!(variable, value, "Cell value is not a code index");
                    None
                } else {
                    let codes = unpack_codes(&local_use);
                    let index = value as usize;
                    match codes.get(index) {
                        Some(code) => Some(code.clone()),
                        None => {
                            warn!(
                                variable,
                                index,
                                available = codes.len(),
                                "Code index outside code table"
                            );
                            None
                        }
                    }
                };

                debug!(variable, valid_time = %valid_time, code = ?code, "Read cell code");
                cells.push(CellCode { valid_time, code });
            }
        }

        Ok(cells)
    }
}
