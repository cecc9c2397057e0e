//! Row model structs for sites and prediction records.
//!
//! All structs derive `Serialize` so command output can be emitted as JSON.

use chrono::{NaiveDate, NaiveDateTime};
use mdp_data::classify::Status;
use serde::Serialize;

/// A registered coastal location eligible for prediction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Site {
    /// Unique site name, used as the registry key.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    pub description: Option<String>,
}

/// One persisted (site, date) prediction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionRecord {
    pub site_name: String,
    pub prediction_date: NaiveDate,
    /// Copied from the site when the prediction was computed.
    pub latitude: f64,
    pub longitude: f64,
    /// Predicted debris mass in kilograms, exactly as the model returned it.
    pub trash_amount: f64,
    pub status: Status,
    pub current_dir: Option<f64>,
    pub current_speed: Option<f64>,
    pub wind_dir: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Sea-surface temperature; `None` when the best-effort lookup failed.
    pub temperature: Option<f64>,
    pub created_at: NaiveDateTime,
}
