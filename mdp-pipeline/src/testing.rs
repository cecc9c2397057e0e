//! In-memory observation source and context builders for pipeline tests.

use crate::context::{PipelineConfig, PipelineContext};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use mdp_data::model::{LinearModel, RegressionModel};
use mdp_db::{Database, Site};
use mdp_obs::{ObservationError, ObservationSource, VectorObservation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Current,
    CurrentNoData,
    /// Current speed comes back as NaN.
    NanCurrent,
    Wind,
    Temperature,
}

/// Returns current (90°, 30) / wind (180°, 5) / 17.5 °C everywhere, except
/// at latitudes registered as failing.
pub struct FakeSource {
    pub current_calls: AtomicUsize,
    pub wind_calls: AtomicUsize,
    pub temperature_calls: AtomicUsize,
    failures: Mutex<Vec<(Option<u64>, Failure)>>,
    delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Every current fetch sleeps for `delay` first.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(Some(delay)))
    }

    fn build(delay: Option<Duration>) -> Self {
        Self {
            current_calls: AtomicUsize::new(0),
            wind_calls: AtomicUsize::new(0),
            temperature_calls: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
            delay,
        }
    }

    pub fn fail(&self, lat: f64, failure: Failure) {
        self.failures.lock().unwrap().push((Some(lat.to_bits()), failure));
    }

    pub fn fail_everywhere(&self, failure: Failure) {
        self.failures.lock().unwrap().push((None, failure));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn total_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
            + self.wind_calls.load(Ordering::SeqCst)
            + self.temperature_calls.load(Ordering::SeqCst)
    }

    fn failing(&self, lat: f64, failure: Failure) -> bool {
        self.failures
            .lock()
            .unwrap()
            .iter()
            .any(|(at, f)| *f == failure && at.map_or(true, |bits| bits == lat.to_bits()))
    }
}

#[async_trait]
impl ObservationSource for FakeSource {
    async fn fetch_current(&self, _at: NaiveDateTime, lat: f64, _lon: f64) -> mdp_obs::Result<VectorObservation> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing(lat, Failure::Current) {
            return Err(ObservationError::Provider("current grid unavailable".to_string()));
        }
        if self.failing(lat, Failure::CurrentNoData) {
            return Err(ObservationError::NoData("no grid sample".to_string()));
        }
        if self.failing(lat, Failure::NanCurrent) {
            return Ok(VectorObservation::new(90.0, f64::NAN));
        }
        Ok(VectorObservation::new(90.0, 30.0))
    }

    async fn fetch_wind(&self, lat: f64, _lon: f64) -> mdp_obs::Result<VectorObservation> {
        self.wind_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing(lat, Failure::Wind) {
            return Err(ObservationError::Provider("station offline".to_string()));
        }
        Ok(VectorObservation::new(180.0, 5.0))
    }

    async fn fetch_temperature(&self, _at: NaiveDateTime, lat: f64, _lon: f64) -> mdp_obs::Result<f64> {
        self.temperature_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing(lat, Failure::Temperature) {
            return Err(ObservationError::NoData("no temperature".to_string()));
        }
        Ok(17.5)
    }
}

/// `100 + 10 · wind_speed + 2 · current_speed`, i.e. 210 kg under the
/// default fake readings.
pub fn fixed_model() -> Arc<dyn RegressionModel> {
    Arc::new(LinearModel {
        intercept: 100.0,
        coefficients: vec![0.0, 0.0, 0.0, 10.0, 2.0, 0.0, 0.0, 0.0, 0.0],
    })
}

pub fn site(name: &str, lat: f64, lon: f64) -> Site {
    Site {
        name: name.to_string(),
        latitude: lat,
        longitude: lon,
        description: None,
    }
}

pub fn context(source: Arc<FakeSource>) -> PipelineContext {
    PipelineContext::new(
        Database::new().unwrap(),
        fixed_model(),
        source,
        PipelineConfig::default(),
    )
}

pub fn seeded_context(source: Arc<FakeSource>, sites: &[Site]) -> PipelineContext {
    let ctx = context(source);
    ctx.db.insert_sites(sites).unwrap();
    ctx
}
