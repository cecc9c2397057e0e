//! Station wind responses.
//!
//! A wind query asks one station for its trailing window of readings and
//! averages every reading that carries both direction and speed.

use crate::{
    error::{ObservationError, Result},
    observation::{numeric, NumericField, VectorObservation},
};
use serde::Deserialize;
use serde_json::Value;

/// Result code the station service uses for success.
pub const SUCCESS_CODE: &str = "00";

/// Trailing window requested from the station, in minutes.
pub const TRAILING_WINDOW_MINUTES: u32 = 60;

/// Upper bound on readings returned for the trailing window.
pub const MAX_READINGS: u32 = 300;

/// Query parameters for a station wind request.
pub fn wind_query_params(service_key: &str, station_code: &str) -> Vec<(&'static str, String)> {
    vec![
        ("serviceKey", service_key.to_string()),
        ("obsCode", station_code.to_string()),
        ("min", TRAILING_WINDOW_MINUTES.to_string()),
        ("numOfRows", MAX_READINGS.to_string()),
        ("type", "json".to_string()),
    ]
}

#[derive(Debug, Clone, Deserialize)]
struct WindReading {
    wndrct: Option<NumericField>,
    wspd: Option<NumericField>,
}

fn header_text(header: &Value, key: &str) -> Option<String> {
    match header.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Parse a station wind response into the mean direction and speed.
pub fn parse_wind_response(body: &str) -> Result<VectorObservation> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| ObservationError::Provider(format!("response is not JSON: {}", e)))?;

    let header = data
        .get("header")
        .ok_or_else(|| ObservationError::Provider("response is missing header".to_string()))?;
    let result_code = header_text(header, "resultCode").unwrap_or_default();
    if result_code != SUCCESS_CODE {
        let message = header_text(header, "resultMsg").unwrap_or_else(|| "Unknown error".to_string());
        return Err(ObservationError::Provider(format!(
            "station service returned {}: {}",
            result_code, message
        )));
    }

    let items = match data
        .get("body")
        .and_then(|b| b.get("items"))
        .and_then(|i| i.get("item"))
    {
        Some(Value::Array(items)) => items.clone(),
        Some(single @ Value::Object(_)) => vec![single.clone()],
        _ => {
            return Err(ObservationError::Provider(
                "response is missing body.items.item".to_string(),
            ))
        }
    };

    let valid: Vec<VectorObservation> = items
        .into_iter()
        .filter_map(|value| {
            let reading: WindReading = serde_json::from_value(value).ok()?;
            Some(VectorObservation::new(
                numeric(&reading.wndrct)?,
                numeric(&reading.wspd)?,
            ))
        })
        .collect();

    if valid.is_empty() {
        return Err(ObservationError::NoData(
            "no wind reading with both direction and speed".to_string(),
        ));
    }

    let count = valid.len() as f64;
    let direction = valid.iter().map(|v| v.direction_deg).sum::<f64>() / count;
    let speed = valid.iter().map(|v| v.speed).sum::<f64>() / count;
    log::debug!("averaged {} wind readings", valid.len());
    Ok(VectorObservation::new(direction, speed))
}
