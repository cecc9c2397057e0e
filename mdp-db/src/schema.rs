//! SQL schema definitions for the prediction database.
//!
//! The schema is applied as a single batch when the database is opened.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `sites` - Registered coastal locations (name, lat/lon, description)
/// - `prediction_records` - One debris prediction per (site, date), with the
///   raw current/wind/temperature inputs it was computed from
///
/// `prediction_records.site_name` references `sites.name`, and a site can hold
/// at most one record per date. Foreign keys are only enforced while
/// `PRAGMA foreign_keys = ON`, which [`crate::Database`] sets on every
/// connection it opens.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS sites (
        name TEXT PRIMARY KEY,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS prediction_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        site_name TEXT NOT NULL REFERENCES sites(name),
        prediction_date TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        trash_amount REAL NOT NULL,
        status TEXT NOT NULL,
        current_dir REAL,
        current_speed REAL,
        wind_dir REAL,
        wind_speed REAL,
        temperature REAL,
        created_at TEXT NOT NULL,
        UNIQUE (site_name, prediction_date)
    );
    CREATE INDEX IF NOT EXISTS idx_pred_date ON prediction_records(prediction_date);
    CREATE INDEX IF NOT EXISTS idx_pred_site ON prediction_records(site_name);
    "#
}
