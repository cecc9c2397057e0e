//! `predict` and `predict-point` commands.

use crate::Settings;
use anyhow::anyhow;
use chrono::{Local, NaiveDateTime};
use log::info;
use mdp_pipeline::orchestrator::predict_point;
use mdp_utils::dates::{parse_date, start_of_day};
use serde::Serialize;

/// Observation timestamp for a `--date` argument: midnight of the given
/// day, or the current local time when no date is given.
pub fn observation_time(date: Option<&str>, now: NaiveDateTime) -> anyhow::Result<NaiveDateTime> {
    match date {
        Some(d) => {
            let day = parse_date(d).map_err(|e| anyhow!("validation error: {}", e))?;
            Ok(start_of_day(day))
        }
        None => Ok(now),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_predict(settings: &Settings, date: Option<&str>) -> anyhow::Result<()> {
    let at = observation_time(date, Local::now().naive_local())?;
    let store = settings.prediction_store()?;
    let records = store.get_or_compute_at(at).await?;
    info!("{} predictions for {}", records.len(), at.date());
    print_json(&records)
}

pub async fn run_predict_point(settings: &Settings, at: &str, lat: f64, lon: f64) -> anyhow::Result<()> {
    let context = settings.pipeline_context()?;
    let prediction = predict_point(&context, at, lat, lon).await?;
    print_json(&prediction)
}
