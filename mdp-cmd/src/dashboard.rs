//! `dashboard` command.

use crate::Settings;
use anyhow::anyhow;
use chrono::Local;
use mdp_pipeline::aggregate::dashboard;
use mdp_utils::dates::parse_date;

pub fn run_dashboard(settings: &Settings, as_of: Option<&str>) -> anyhow::Result<()> {
    let today = match as_of {
        Some(d) => parse_date(d).map_err(|e| anyhow!("validation error: {}", e))?,
        None => Local::now().date_naive(),
    };
    let db = settings.open_database()?;
    let response = dashboard(&db, today)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
