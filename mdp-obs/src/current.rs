//! Gridded ocean-current responses.
//!
//! The current service reports on a fixed grid, so a query covers the
//! 1°×1° box around the site and the closest grid point wins.

use crate::{
    error::{ObservationError, Result},
    observation::{nearest_by_distance, numeric, NumericField, VectorObservation},
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

/// Date format for the grid query `Date` parameter: "YYYYMMDD"
pub const QUERY_DATE_FORMAT: &str = "%Y%m%d";

/// Integer bounding box around a query point, as the grid services expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl GridBounds {
    /// Floor/ceil of latitude (Y) and longitude (X).
    pub fn around(lat: f64, lon: f64) -> Self {
        Self {
            min_x: lon.floor() as i64,
            max_x: lon.ceil() as i64,
            min_y: lat.floor() as i64,
            max_y: lat.ceil() as i64,
        }
    }
}

/// Query parameters shared by the gridded current and temperature services.
pub fn grid_query_params(
    service_key: &str,
    at: &NaiveDateTime,
    lat: f64,
    lon: f64,
) -> Vec<(&'static str, String)> {
    let bounds = GridBounds::around(lat, lon);
    vec![
        ("ServiceKey", service_key.to_string()),
        ("Date", at.format(QUERY_DATE_FORMAT).to_string()),
        ("Hour", at.format("%H").to_string()),
        ("Minute", at.format("%M").to_string()),
        ("MaxX", bounds.max_x.to_string()),
        ("MinX", bounds.min_x.to_string()),
        ("MaxY", bounds.max_y.to_string()),
        ("MinY", bounds.min_y.to_string()),
        ("ResultType", "json".to_string()),
    ]
}

/// One grid point of a current response.
#[derive(Debug, Clone, Deserialize)]
struct CurrentSample {
    current_dir: Option<NumericField>,
    current_speed: Option<NumericField>,
    pre_lat: Option<NumericField>,
    pre_lon: Option<NumericField>,
}

/// Extract `result.data` from a grid response body.
pub(crate) fn grid_samples(body: &str) -> Result<Vec<Value>> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| ObservationError::Provider(format!("response is not JSON: {}", e)))?;
    match data.get("result").and_then(|r| r.get("data")) {
        Some(Value::Array(samples)) => Ok(samples.clone()),
        _ => Err(ObservationError::Provider(
            "response is missing result.data".to_string(),
        )),
    }
}

/// Parse a grid current response and resolve the sample nearest to (lat, lon).
///
/// Samples without direction, speed or coordinates are ignored.
pub fn parse_current_response(body: &str, lat: f64, lon: f64) -> Result<VectorObservation> {
    let samples = grid_samples(body)?;
    let candidates = samples.into_iter().filter_map(|value| {
        let sample: CurrentSample = serde_json::from_value(value).ok()?;
        let direction = numeric(&sample.current_dir)?;
        let speed = numeric(&sample.current_speed)?;
        let sample_lat = numeric(&sample.pre_lat)?;
        let sample_lon = numeric(&sample.pre_lon)?;
        Some((sample_lat, sample_lon, VectorObservation::new(direction, speed)))
    });
    nearest_by_distance(candidates, lat, lon).ok_or_else(|| {
        ObservationError::NoData(format!("no current sample near ({}, {})", lat, lon))
    })
}
