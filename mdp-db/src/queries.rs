//! Typed query and write methods for sites and prediction records.
//!
//! Dates are stored as `YYYY-MM-DD` text, so range filters compare
//! lexicographically and stay in calendar order.

use crate::models::{PredictionRecord, Site};
use crate::Database;
use anyhow::bail;
use chrono::NaiveDate;
use mdp_data::classify::Status;
use rusqlite::types::Type;
use rusqlite::{params, Row};

const RECORD_COLUMNS: &str = "site_name, prediction_date, latitude, longitude, trash_amount, status, \
     current_dir, current_speed, wind_dir, wind_speed, temperature, created_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    let label: String = row.get(5)?;
    let status = label.parse::<Status>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::<dyn std::error::Error + Send + Sync>::from(e))
    })?;
    Ok(PredictionRecord {
        site_name: row.get(0)?,
        prediction_date: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        trash_amount: row.get(4)?,
        status,
        current_dir: row.get(6)?,
        current_speed: row.get(7)?,
        wind_dir: row.get(8)?,
        wind_speed: row.get(9)?,
        temperature: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl Database {
    // ───────────────────── Sites ─────────────────────

    /// All registered sites ordered by name.
    pub fn query_sites(&self) -> anyhow::Result<Vec<Site>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, latitude, longitude, description FROM sites ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Site {
                    name: row.get(0)?,
                    latitude: row.get(1)?,
                    longitude: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query: query_sites returned {} records", rows.len());
        Ok(rows)
    }

    // ───────────────────── Prediction Records ─────────────────────

    /// Every record stored for `date`, ordered by site name.
    pub fn query_records_for_date(&self, date: &NaiveDate) -> anyhow::Result<Vec<PredictionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prediction_records WHERE prediction_date = ?1 ORDER BY site_name",
            RECORD_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![date], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_records_for_date({}) returned {} records",
            date,
            rows.len()
        );
        Ok(rows)
    }

    /// Replace every record for `date` with `records` in one transaction.
    ///
    /// Either the old rows are all gone and the new rows all present, or
    /// nothing changes. All `records` must carry `date` as their
    /// prediction date.
    pub fn replace_records_for_date(
        &self,
        date: &NaiveDate,
        records: &[PredictionRecord],
    ) -> anyhow::Result<usize> {
        if let Some(stray) = records.iter().find(|r| r.prediction_date != *date) {
            bail!(
                "record for {} is dated {}, expected {}",
                stray.site_name,
                stray.prediction_date,
                date
            );
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM prediction_records WHERE prediction_date = ?1",
            params![date],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO prediction_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                RECORD_COLUMNS
            ))?;
            for r in records {
                stmt.execute(params![
                    r.site_name,
                    r.prediction_date,
                    r.latitude,
                    r.longitude,
                    r.trash_amount,
                    r.status.as_str(),
                    r.current_dir,
                    r.current_speed,
                    r.wind_dir,
                    r.wind_speed,
                    r.temperature,
                    r.created_at,
                ])?;
            }
        }
        tx.commit()?;
        log::info!(
            "store: replaced {} records for {} with {}",
            deleted,
            date,
            records.len()
        );
        Ok(records.len())
    }

    // ───────────────────── Aggregates ─────────────────────

    /// Sum of `trash_amount` over records dated within `[first, last]`.
    ///
    /// An empty range sums to `0.0`.
    pub fn query_total_between(&self, first: &NaiveDate, last: &NaiveDate) -> anyhow::Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(trash_amount), 0.0) FROM prediction_records
             WHERE prediction_date >= ?1 AND prediction_date <= ?2",
            params![first, last],
            |row| row.get(0),
        )?;
        log::debug!("query: query_total_between({}, {}) = {}", first, last, total);
        Ok(total)
    }

    /// For each site with a record in `[first, last]`, the record with the
    /// greatest date in that range. Ordered by site name.
    pub fn query_latest_per_site_between(
        &self,
        first: &NaiveDate,
        last: &NaiveDate,
    ) -> anyhow::Result<Vec<PredictionRecord>> {
        let conn = self.conn()?;
        let columns = RECORD_COLUMNS
            .split(", ")
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {}
             FROM prediction_records p
             INNER JOIN (
                 SELECT site_name, MAX(prediction_date) AS latest
                 FROM prediction_records
                 WHERE prediction_date >= ?1 AND prediction_date <= ?2
                 GROUP BY site_name
             ) m ON p.site_name = m.site_name AND p.prediction_date = m.latest
             ORDER BY p.site_name",
            columns
        ))?;
        let rows = stmt
            .query_map(params![first, last], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_latest_per_site_between({}, {}) returned {} records",
            first,
            last,
            rows.len()
        );
        Ok(rows)
    }
}
