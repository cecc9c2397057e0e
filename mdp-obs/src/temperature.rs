//! Gridded sea-surface temperature responses.

use crate::{
    current::grid_samples,
    error::{ObservationError, Result},
    observation::{nearest_by_distance, numeric, NumericField},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct TemperatureSample {
    water_temp: Option<NumericField>,
    pre_lat: Option<NumericField>,
    pre_lon: Option<NumericField>,
}

/// Parse a grid temperature response and return the reading nearest to (lat, lon).
pub fn parse_temperature_response(body: &str, lat: f64, lon: f64) -> Result<f64> {
    let samples = grid_samples(body)?;
    let candidates = samples.into_iter().filter_map(|value| {
        let sample: TemperatureSample = serde_json::from_value(value).ok()?;
        Some((
            numeric(&sample.pre_lat)?,
            numeric(&sample.pre_lon)?,
            numeric(&sample.water_temp)?,
        ))
    });
    nearest_by_distance(candidates, lat, lon).ok_or_else(|| {
        ObservationError::NoData(format!("no temperature sample near ({}, {})", lat, lon))
    })
}
