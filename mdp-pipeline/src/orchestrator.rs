//! Single-site prediction: observations → features → model → labels.

use crate::context::PipelineContext;
use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use mdp_data::classify::Status;
use mdp_data::features;
use mdp_db::{PredictionRecord, Site};
use mdp_obs::{ObservationError, VectorObservation};
use mdp_utils::dates::parse_timestamp;
use serde::Serialize;

/// A model estimate for one point, before it is attached to a site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub current: VectorObservation,
    pub wind: VectorObservation,
    pub trash_amount: f64,
    pub status: Status,
}

/// Result of an ad-hoc prediction for arbitrary coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPrediction {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub trash_amount: f64,
    pub status: Status,
}

fn finite(observation: VectorObservation, label: &str) -> Result<VectorObservation> {
    if observation.direction_deg.is_finite() && observation.speed.is_finite() {
        Ok(observation)
    } else {
        Err(ObservationError::NoData(format!("non-finite {} reading {:?}", label, observation)).into())
    }
}

/// Fetch current and wind for (lat, lon), build features and run the model.
///
/// Non-finite readings or model outputs fail the point rather than
/// producing a record that cannot be stored.
pub async fn estimate(ctx: &PipelineContext, at: NaiveDateTime, lat: f64, lon: f64) -> Result<Estimate> {
    let current = finite(ctx.source.fetch_current(at, lat, lon).await?, "current")?;
    let wind = finite(ctx.source.fetch_wind(lat, lon).await?, "wind")?;
    let x = features::build(&at, current.direction_deg, current.speed, wind.direction_deg, wind.speed);
    let trash_amount = ctx.model.predict(&x);
    if !trash_amount.is_finite() {
        return Err(PipelineError::Prediction(format!(
            "model returned {} for ({}, {})",
            trash_amount, lat, lon
        )));
    }
    Ok(Estimate {
        current,
        wind,
        trash_amount,
        status: Status::for_mass(trash_amount),
    })
}

/// Compute the prediction record for one site at `at`.
///
/// Current or wind failures fail the site. Temperature is best effort and
/// recorded as `None` when it cannot be fetched.
pub async fn predict_site(ctx: &PipelineContext, site: &Site, at: NaiveDateTime) -> Result<PredictionRecord> {
    let estimate = estimate(ctx, at, site.latitude, site.longitude).await?;
    let temperature = match ctx
        .source
        .fetch_temperature(at, site.latitude, site.longitude)
        .await
    {
        Ok(t) if t.is_finite() => Some(t),
        Ok(t) => {
            log::debug!("Discarding non-finite temperature {} for {}", t, site.name);
            None
        }
        Err(e) => {
            log::debug!("No temperature for {}: {}", site.name, e);
            None
        }
    };
    log::debug!(
        "{}: predicted {:.2} kg ({})",
        site.name,
        estimate.trash_amount,
        estimate.status
    );
    Ok(PredictionRecord {
        site_name: site.name.clone(),
        prediction_date: at.date(),
        latitude: site.latitude,
        longitude: site.longitude,
        trash_amount: estimate.trash_amount,
        status: estimate.status,
        current_dir: Some(estimate.current.direction_deg),
        current_speed: Some(estimate.current.speed),
        wind_dir: Some(estimate.wind.direction_deg),
        wind_speed: Some(estimate.wind.speed),
        temperature,
        created_at: Utc::now().naive_utc(),
    })
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(PipelineError::Validation(format!(
            "latitude {} outside [-90, 90]",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(PipelineError::Validation(format!(
            "longitude {} outside [-180, 180]",
            lon
        )));
    }
    Ok(())
}

/// Predict for arbitrary coordinates at an ISO-8601 local timestamp.
///
/// Nothing is persisted. Observation failures are returned to the caller.
pub async fn predict_point(ctx: &PipelineContext, timestamp: &str, lat: f64, lon: f64) -> Result<PointPrediction> {
    let at = parse_timestamp(timestamp)?;
    validate_coordinates(lat, lon)?;
    let estimate = estimate(ctx, at, lat, lon).await?;
    Ok(PointPrediction {
        date: at.date(),
        latitude: lat,
        longitude: lon,
        trash_amount: estimate.trash_amount,
        status: estimate.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PipelineConfig, PipelineContext};
    use crate::testing::{context, site, FakeSource, Failure};
    use chrono::NaiveDate;
    use mdp_data::features::FeatureVector;
    use mdp_data::model::RegressionModel;
    use mdp_db::Database;
    use mdp_obs::ObservationError;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct NanModel;

    impl RegressionModel for NanModel {
        fn predict(&self, _features: &FeatureVector) -> f64 {
            f64::NAN
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_predict_site_builds_record() {
        let source = FakeSource::new();
        let ctx = context(source.clone());
        let hamdeok = site("Hamdeok", 33.543, 126.669);

        let record = predict_site(&ctx, &hamdeok, noon()).await.unwrap();
        assert_eq!(record.site_name, "Hamdeok");
        assert_eq!(record.prediction_date, noon().date());
        assert_eq!(record.latitude, 33.543);
        // fixed model: 100 + 10 * wind_speed(5) + 2 * current_speed(30)
        assert!((record.trash_amount - 210.0).abs() < 1e-9);
        assert_eq!(record.status, Status::Medium);
        assert_eq!(record.current_speed, Some(30.0));
        assert_eq!(record.wind_dir, Some(180.0));
        assert_eq!(record.temperature, Some(17.5));
        assert_eq!(source.current_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_temperature_failure_is_tolerated() {
        let source = FakeSource::new();
        source.fail(33.543, Failure::Temperature);
        let ctx = context(source.clone());

        let record = predict_site(&ctx, &site("Hamdeok", 33.543, 126.669), noon())
            .await
            .unwrap();
        assert_eq!(record.temperature, None);
        assert!((record.trash_amount - 210.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_wind_failure_fails_site() {
        let source = FakeSource::new();
        source.fail(33.543, Failure::Wind);
        let ctx = context(source);

        let err = predict_site(&ctx, &site("Hamdeok", 33.543, 126.669), noon())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Observation(ObservationError::Provider(_))));
    }

    #[tokio::test]
    async fn test_predict_point() {
        let ctx = context(FakeSource::new());
        let point = predict_point(&ctx, "2016-01-05T15:20:00", 33.5, 126.5)
            .await
            .unwrap();
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2016, 1, 5).unwrap());
        assert_eq!(point.latitude, 33.5);
        assert!((point.trash_amount - 210.0).abs() < 1e-9);
        assert_eq!(point.status, Status::Medium);
    }

    #[tokio::test]
    async fn test_predict_point_rejects_bad_input() {
        let source = FakeSource::new();
        let ctx = context(source.clone());

        let err = predict_point(&ctx, "2016-01-05T15:20:00", 91.0, 126.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let err = predict_point(&ctx, "2016-01-05T15:20:00", 33.5, -180.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let err = predict_point(&ctx, "not a time", 33.5, 126.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        assert_eq!(source.current_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_predict_point_accepts_boundaries() {
        let ctx = context(FakeSource::new());
        assert!(predict_point(&ctx, "2016-01-05T00:00", 90.0, -180.0).await.is_ok());
        assert!(predict_point(&ctx, "2016-01-05T00:00", -90.0, 180.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_predict_point_surfaces_no_data() {
        let source = FakeSource::new();
        source.fail_everywhere(Failure::CurrentNoData);
        let ctx = context(source);
        let err = predict_point(&ctx, "2016-01-05T15:20:00", 33.5, 126.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Observation(ObservationError::NoData(_))));
    }

    #[tokio::test]
    async fn test_non_finite_current_fails_site() {
        let source = FakeSource::new();
        source.fail(33.543, Failure::NanCurrent);
        let ctx = context(source);
        let err = predict_site(&ctx, &site("Hamdeok", 33.543, 126.669), noon())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Observation(ObservationError::NoData(_))));
    }

    #[tokio::test]
    async fn test_non_finite_model_output_fails_site() {
        let ctx = PipelineContext::new(
            Database::new().unwrap(),
            Arc::new(NanModel),
            FakeSource::new(),
            PipelineConfig::default(),
        );
        let err = predict_site(&ctx, &site("Hamdeok", 33.543, 126.669), noon())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Prediction(_)));
    }
}
