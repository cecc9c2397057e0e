//! CSV loading for the site registry.
//!
//! # CSV Format
//!
//! - **Sites** (has headers): `name,latitude,longitude,description`
//!
//! The description column may be empty or absent.

use crate::models::Site;
use crate::Database;
use anyhow::Context;
use rusqlite::params;

impl Database {
    /// Load sites from a CSV string.
    ///
    /// Existing sites with the same name are left untouched, so loading the
    /// same file twice is harmless. Returns the number of newly inserted
    /// sites.
    ///
    /// # Example CSV
    /// ```text
    /// name,latitude,longitude,description
    /// Hamdeok,33.5432,126.6695,White sand beach east of Jeju city
    /// ```
    pub fn load_sites(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut sites = Vec::new();
        let mut skipped = 0u32;
        for (line, result) in rdr.records().enumerate() {
            let r = result?;
            let name = r.get(0).unwrap_or("");
            if name.is_empty() {
                skipped += 1;
                continue;
            }
            let latitude: f64 = r
                .get(1)
                .unwrap_or("")
                .parse()
                .with_context(|| format!("row {}: bad latitude for site '{}'", line + 1, name))?;
            let longitude: f64 = r
                .get(2)
                .unwrap_or("")
                .parse()
                .with_context(|| format!("row {}: bad longitude for site '{}'", line + 1, name))?;
            let description = r.get(3).filter(|d| !d.is_empty()).map(str::to_string);
            sites.push(Site {
                name: name.to_string(),
                latitude,
                longitude,
                description,
            });
        }

        let inserted = self.insert_sites(&sites)?;
        log::info!(
            "loader: Loaded {} new sites ({} rows read, {} skipped)",
            inserted,
            sites.len(),
            skipped
        );
        Ok(inserted)
    }

    /// Insert sites, ignoring names that are already registered.
    pub fn insert_sites(&self, sites: &[Site]) -> anyhow::Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO sites (name, latitude, longitude, description)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for site in sites {
                inserted += stmt.execute(params![
                    site.name,
                    site.latitude,
                    site.longitude,
                    site.description
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
