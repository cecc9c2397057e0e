//! reqwest-backed [`ObservationSource`].

use crate::{
    current::{grid_query_params, parse_current_response},
    error::{ObservationError, Result},
    observation::VectorObservation,
    source::ObservationSource,
    station::Station,
    temperature::parse_temperature_response,
    wind::{parse_wind_response, wind_query_params},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

/// Default per-request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider endpoints and service keys.
#[derive(Debug, Clone)]
pub struct ObservationConfig {
    pub current_url: String,
    pub current_key: String,
    pub wind_url: String,
    pub wind_key: String,
    /// Temperature is best-effort; without an endpoint every lookup misses.
    pub temperature_url: Option<String>,
    pub temperature_key: Option<String>,
    pub timeout: Duration,
}

/// HTTP client for the current grid, wind station and temperature services.
pub struct ObservationClient {
    client: Client,
    config: ObservationConfig,
    stations: Vec<Station>,
}

impl ObservationClient {
    /// Build a client with the configured timeout and the embedded station table.
    pub fn new(config: ObservationConfig) -> Result<Self> {
        let stations = Station::station_table()?;
        Self::with_stations(config, stations)
    }

    /// Build a client against a custom station table.
    pub fn with_stations(config: ObservationConfig, stations: Vec<Station>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        info!(
            "Observation client ready ({} wind stations, timeout {:?})",
            stations.len(),
            config.timeout
        );
        Ok(Self {
            client,
            config,
            stations,
        })
    }

    /// GET `url` with `params` and return the body of a successful response.
    async fn get_body(&self, label: &str, url: &str, params: &[(&'static str, String)]) -> Result<String> {
        // keys stay out of the log line
        debug!("{} request to {}", label, url);
        let response = self.client.get(url).query(params).send().await?;
        if !response.status().is_success() {
            return Err(ObservationError::Provider(format!(
                "{} request failed with HTTP {}",
                label,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ObservationSource for ObservationClient {
    async fn fetch_current(&self, at: NaiveDateTime, lat: f64, lon: f64) -> Result<VectorObservation> {
        let params = grid_query_params(&self.config.current_key, &at, lat, lon);
        let body = self.get_body("current", &self.config.current_url, &params).await?;
        parse_current_response(&body, lat, lon)
    }

    async fn fetch_wind(&self, lat: f64, lon: f64) -> Result<VectorObservation> {
        let station = Station::find_nearest(&self.stations, lat, lon).ok_or_else(|| {
            ObservationError::NoData("wind station table is empty".to_string())
        })?;
        debug!(
            "nearest wind station to ({}, {}) is {} ({})",
            lat, lon, station.name, station.code
        );
        let params = wind_query_params(&self.config.wind_key, &station.code);
        let body = self.get_body("wind", &self.config.wind_url, &params).await?;
        parse_wind_response(&body)
    }

    async fn fetch_temperature(&self, at: NaiveDateTime, lat: f64, lon: f64) -> Result<f64> {
        let url = self.config.temperature_url.as_deref().ok_or_else(|| {
            ObservationError::NoData("temperature provider is not configured".to_string())
        })?;
        let key = self.config.temperature_key.as_deref().unwrap_or_default();
        let params = grid_query_params(key, &at, lat, lon);
        let body = self.get_body("temperature", url, &params).await?;
        parse_temperature_response(&body, lat, lon)
    }
}
