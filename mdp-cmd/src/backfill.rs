//! Backfill - fill predictions for a range of past dates.
//!
//! Dates already complete in the store are served from cache, so a backfill
//! can be re-run over the same range and only computes what is missing.

use crate::Settings;
use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use log::{info, warn};
use mdp_pipeline::PredictionStore;
use mdp_utils::dates::{month_starts, parse_date, DateRange};
use std::time::Duration;

/// Dates to process for `[start, end]`: every day, or with `monthly` the
/// first day of each month from `start`'s month through `end`'s month.
pub fn backfill_dates(start: NaiveDate, end: NaiveDate, monthly: bool) -> anyhow::Result<Vec<NaiveDate>> {
    if end < start {
        bail!("validation error: end date {} is before start date {}", end, start);
    }
    Ok(if monthly {
        month_starts(&start, &end)
    } else {
        DateRange::new(start, end).collect()
    })
}

#[derive(Debug, Default)]
pub struct BackfillSummary {
    pub succeeded: Vec<(NaiveDate, usize)>,
    pub failed: Vec<(NaiveDate, String)>,
}

/// Run `get_or_compute` for every date, pausing between dates.
///
/// A failing date is recorded and the run continues.
pub async fn backfill(store: &PredictionStore, dates: &[NaiveDate], pause: Duration) -> BackfillSummary {
    let mut summary = BackfillSummary::default();
    for (i, date) in dates.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        match store.get_or_compute(*date).await {
            Ok(records) => {
                info!("[{}/{}] {}: {} records", i + 1, dates.len(), date, records.len());
                summary.succeeded.push((*date, records.len()));
            }
            Err(e) => {
                warn!("[{}/{}] {}: {}", i + 1, dates.len(), date, e);
                summary.failed.push((*date, e.to_string()));
            }
        }
    }
    summary
}

pub async fn run_backfill(
    settings: &Settings,
    start: &str,
    end: &str,
    monthly: bool,
    pause_ms: u64,
) -> anyhow::Result<()> {
    let start = parse_date(start).map_err(|e| anyhow!("validation error: {}", e))?;
    let end = parse_date(end).map_err(|e| anyhow!("validation error: {}", e))?;
    let dates = backfill_dates(start, end, monthly)?;
    info!(
        "Backfilling {} dates from {} to {}{}",
        dates.len(),
        start,
        end,
        if monthly { " (monthly)" } else { "" }
    );

    let store = settings.prediction_store()?;
    let summary = backfill(&store, &dates, Duration::from_millis(pause_ms)).await;

    println!(
        "Backfill finished: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    for (date, reason) in &summary.failed {
        println!("  {} failed: {}", date, reason);
    }
    Ok(())
}
