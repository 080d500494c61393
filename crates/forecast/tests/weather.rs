//! Weather and hazard text against synthetic `wx`/`wwa` grids.

mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{cycle, TestSource};
use forecast::WeatherQuery;
use ndfd_common::NdfdError;
use test_utils::fixtures::{guam_grid_at, packed, points};
use test_utils::pack_codes;

const WX_CODES: [&str; 3] = [
    "<NoCov>:<NoWx>:<NoInten>:<NoVis>:",
    "Lkly:A:-:0SM:LgA",
    "Sct:SW:-:<NoVis>:",
];

fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, hour, 0, 0).unwrap()
}

/// Guam grid whose cell at Hagatna holds `index`.
fn code_message(payload: &[u8], index: f32, hour: u32) -> Vec<u8> {
    guam_grid_at(points::HAGATNA, 5, 5, 2, 2)
        .with_parameter(0, 1, 192)
        .with_local_use(payload.to_vec())
        .with_constant_value(index)
        .with_forecast_hour(hour)
        .build()
}

fn wx(index: f32, hour: u32) -> Vec<u8> {
    code_message(&pack_codes(&WX_CODES), index, hour)
}

fn wwa(index: f32, hour: u32) -> Vec<u8> {
    code_message(packed::WWA_SAMPLE, index, hour)
}

#[tokio::test]
async fn test_weather_and_hazards() {
    let source = TestSource::new();
    source.variable_groups("guam", "wx", &[wx(1.0, 1), wx(2.0, 2)], &[wx(0.0, 3)]);
    source.variable("guam", "001-003", "wwa", &[wwa(3.0, 1), wwa(1.0, 5)]);

    let query = WeatherQuery::new(points::HAGATNA.0, points::HAGATNA.1);
    let result = source
        .analyzer()
        .analyze_weather_for_cycle(&query, cycle())
        .await
        .unwrap();

    assert_eq!(result.region, "guam");
    assert_eq!(
        result.forecasts.keys().copied().collect::<Vec<_>>(),
        vec![at_hour(13), at_hour(14), at_hour(15), at_hour(17)]
    );

    let hail = &result.forecasts[&at_hour(13)];
    assert_eq!(hail.wx_string, "Lkly:A:-:0SM:LgA");
    assert_eq!(hail.weather_string, "Light hail likely with large hail");
    assert_eq!(hail.visibility, 0.0);
    assert_eq!(hail.wwa_string, "HZ.A");
    assert_eq!(hail.advisory_string, "Hard Freeze Watch");

    let snow = &result.forecasts[&at_hour(14)];
    assert_eq!(snow.weather_string, "Scattered light snow showers");
    assert!(snow.visibility.is_nan());
    assert!(snow.wwa_string.is_empty());

    let clear = &result.forecasts[&at_hour(15)];
    assert_eq!(clear.weather_string, "<NoWx>");

    // Only the hazard grid covers 17Z
    let gale = &result.forecasts[&at_hour(17)];
    assert!(gale.wx_string.is_empty());
    assert!(gale.visibility.is_nan());
    assert_eq!(gale.advisory_string, "Gale Watch");

    let header = result.header.unwrap();
    assert_eq!(header.units, "code");
    assert_eq!(header.delta_x, 2500.0);
}

#[tokio::test]
async fn test_index_outside_code_table() {
    let source = TestSource::new();
    source.variable_groups("guam", "wx", &[wx(7.0, 1)], &[]);
    source.variable("guam", "001-003", "wwa", &[]);

    let query = WeatherQuery::new(points::HAGATNA.0, points::HAGATNA.1);
    let result = source
        .analyzer()
        .analyze_weather_for_cycle(&query, cycle())
        .await
        .unwrap();

    let record = &result.forecasts[&at_hour(13)];
    assert!(record.wx_string.is_empty());
    assert!(record.weather_string.is_empty());
}

#[tokio::test]
async fn test_cell_value_not_an_index() {
    let source = TestSource::new();
    source.variable_groups("guam", "wx", &[wx(-1.0, 1), wx(1.5, 2)], &[]);
    source.variable("guam", "001-003", "wwa", &[]);

    let query = WeatherQuery::new(points::HAGATNA.0, points::HAGATNA.1);
    let result = source
        .analyzer()
        .analyze_weather_for_cycle(&query, cycle())
        .await
        .unwrap();

    for hour in [13, 14] {
        let record = &result.forecasts[&at_hour(hour)];
        assert!(record.wx_string.is_empty());
        assert!(record.weather_string.is_empty());
        assert!(record.visibility.is_nan());
    }
}

#[tokio::test]
async fn test_missing_local_use_section() {
    let source = TestSource::new();
    let bare = guam_grid_at(points::HAGATNA, 5, 5, 2, 2)
        .with_constant_value(1.0)
        .with_forecast_hour(1)
        .build();
    source.variable_groups("guam", "wx", &[bare], &[]);

    let query = WeatherQuery::new(points::HAGATNA.0, points::HAGATNA.1).in_region("guam");
    let result = source
        .analyzer()
        .analyze_weather_for_cycle(&query, cycle())
        .await;

    assert!(matches!(result, Err(NdfdError::Decode(_))));
}

#[tokio::test]
async fn test_region_without_weather() {
    let source = TestSource::new();
    let query = WeatherQuery::new(points::HAGATNA.0, points::HAGATNA.1).in_region("nhemi");

    let result = source
        .analyzer()
        .analyze_weather_for_cycle(&query, cycle())
        .await;

    assert!(matches!(result, Err(NdfdError::InvalidVariable { .. })));
}
