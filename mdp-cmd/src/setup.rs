//! Environment setup: schema and site registry.

use crate::Settings;
use anyhow::Context;
use log::info;

/// Jeju coastal beaches used when no registry file is given.
pub const DEFAULT_SITES_CSV: &str = include_str!("../../fixtures/sites.csv");

/// Read a sites CSV from `path`, or the bundled registry when `None`.
pub fn sites_csv(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("cannot read sites file {}", p)),
        None => Ok(DEFAULT_SITES_CSV.to_string()),
    }
}

pub fn run_init_db(settings: &Settings, sites: Option<&str>) -> anyhow::Result<()> {
    let db = settings.open_database()?;
    let csv = sites_csv(sites)?;
    let inserted = db.load_sites(&csv)?;
    let total = db.query_sites()?.len();
    info!(
        "Database {} ready: {} new sites, {} registered",
        settings.database.display(),
        inserted,
        total
    );
    println!("{} sites registered ({} new)", total, inserted);
    Ok(())
}
