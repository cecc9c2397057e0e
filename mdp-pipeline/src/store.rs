//! Cache-first, per-date prediction batches.
//!
//! A date's stored records are served as-is when they cover every
//! registered site. Otherwise every site is recomputed and the date's rows
//! are replaced in one transaction with whatever succeeded. A date left
//! partial by a failing site is recomputed in full on the next request.

use crate::context::PipelineContext;
use crate::error::{PipelineError, Result};
use crate::orchestrator::predict_site;
use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use mdp_db::{PredictionRecord, Site};
use mdp_utils::dates::start_of_day;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

pub struct PredictionStore {
    ctx: Arc<PipelineContext>,
    /// One async lock per date so concurrent requests share a recompute.
    flights: Mutex<HashMap<NaiveDate, Arc<tokio::sync::Mutex<()>>>>,
}

/// A caller's share of a date's lock. The last holder removes the map entry.
struct Flight<'a> {
    flights: &'a Mutex<HashMap<NaiveDate, Arc<tokio::sync::Mutex<()>>>>,
    date: NaiveDate,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        // Clones are only taken under the map lock, so the count cannot grow here.
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        let ours = flights
            .get(&self.date)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock));
        if ours && Arc::strong_count(&self.lock) == 2 {
            flights.remove(&self.date);
        }
    }
}

impl PredictionStore {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self {
            ctx,
            flights: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Predictions for `date`, observed at midnight when they must be computed.
    pub async fn get_or_compute(&self, date: NaiveDate) -> Result<Vec<PredictionRecord>> {
        self.get_or_compute_at(start_of_day(date)).await
    }

    /// Predictions for `at`'s calendar day, observed at `at` when they must
    /// be computed.
    pub async fn get_or_compute_at(&self, at: NaiveDateTime) -> Result<Vec<PredictionRecord>> {
        let date = at.date();
        let sites = self.ctx.db.query_sites()?;
        if sites.is_empty() {
            return Err(PipelineError::Config(
                "site registry is empty; run init-db first".to_string(),
            ));
        }

        if let Some(records) = self.stored_if_complete(&date, &sites)? {
            log::info!("Cache hit for {}: {} records", date, records.len());
            return Ok(records);
        }

        let flight = self.flight(date);
        let _guard = flight.lock.lock().await;

        if let Some(records) = self.stored_if_complete(&date, &sites)? {
            log::info!("Joined concurrent recompute for {}: {} records", date, records.len());
            return Ok(records);
        }

        log::info!("Cache miss for {}: recomputing {} sites", date, sites.len());
        self.recompute(&sites, at).await
    }

    fn flight(&self, date: NaiveDate) -> Flight<'_> {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        Flight {
            flights: &self.flights,
            date,
            lock: flights.entry(date).or_default().clone(),
        }
    }

    fn stored_if_complete(&self, date: &NaiveDate, sites: &[Site]) -> Result<Option<Vec<PredictionRecord>>> {
        let records = self.ctx.db.query_records_for_date(date)?;
        let stored: BTreeSet<&str> = records.iter().map(|r| r.site_name.as_str()).collect();
        let registry: BTreeSet<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        if stored == registry {
            Ok(Some(records))
        } else {
            if !records.is_empty() {
                log::info!(
                    "Stored set for {} is partial ({} of {} sites)",
                    date,
                    stored.len(),
                    registry.len()
                );
            }
            Ok(None)
        }
    }

    async fn recompute(&self, sites: &[Site], at: NaiveDateTime) -> Result<Vec<PredictionRecord>> {
        let date = at.date();
        let results: Vec<Result<PredictionRecord>> = stream::iter(sites.to_vec())
            .map(|site| {
                let ctx = self.ctx.clone();
                async move { predict_site(&ctx, &site, at).await }
            })
            .buffered(self.ctx.concurrency())
            .collect()
            .await;

        let mut successes = Vec::with_capacity(sites.len());
        for (site, result) in sites.iter().zip(results) {
            match result {
                Ok(record) => successes.push(record),
                Err(e) => log::warn!("Skipping {} for {}: {}", site.name, date, e),
            }
        }

        if successes.is_empty() {
            log::warn!("Every site failed for {}; keeping stored rows", date);
            return Err(PipelineError::BatchFailure {
                date,
                attempted: sites.len(),
            });
        }

        self.ctx.db.replace_records_for_date(&date, &successes)?;
        log::info!(
            "Stored {} of {} predictions for {}",
            successes.len(),
            sites.len(),
            date
        );
        Ok(successes)
    }
}
