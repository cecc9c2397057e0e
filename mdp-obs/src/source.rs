//! The seam between the prediction pipeline and the observation networks.

use crate::{error::Result, observation::VectorObservation};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Resolves environmental inputs for a single query point.
///
/// The HTTP implementation lives in [`crate::client`] behind the `api`
/// feature; tests supply in-memory sources.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Ocean current at the grid point nearest to (lat, lon) for `at`.
    async fn fetch_current(&self, at: NaiveDateTime, lat: f64, lon: f64) -> Result<VectorObservation>;

    /// Mean wind over the nearest station's trailing window.
    async fn fetch_wind(&self, lat: f64, lon: f64) -> Result<VectorObservation>;

    /// Sea-surface temperature near (lat, lon) for `at`.
    async fn fetch_temperature(&self, at: NaiveDateTime, lat: f64, lon: f64) -> Result<f64>;
}
