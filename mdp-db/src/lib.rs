//! SQLite persistence layer for marine debris predictions.
//!
//! This crate owns the site registry and the prediction record store. It
//! exposes typed query methods over a shared connection that the batch
//! pipeline and the dashboard aggregator both read from.
//!
//! # Usage
//!
//! ```rust
//! use mdp_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_sites("name,latitude,longitude,description\nHamdeok,33.543,126.669,Sandy beach\n").unwrap();
//!
//! let sites = db.query_sites().unwrap();
//! assert_eq!(sites.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.
//!
//! - `sites` - Registered coastal locations
//! - `prediction_records` - Per-(site, date) predictions
//!
//! Monthly totals and "latest per site" views are derived on the fly via
//! SQL aggregation against `prediction_records`.

pub mod schema;
mod loader;
mod queries;
pub mod models;

pub use models::{PredictionRecord, Site};

use anyhow::anyhow;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite database holding sites and prediction records.
///
/// This struct is cheaply cloneable (via `Arc`) and can be shared across
/// tokio tasks. Every call takes the connection lock for its duration, so
/// multi-statement writes such as
/// [`replace_records_for_date`](Self::replace_records_for_date) are never
/// interleaved with other writers.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Opening database {}", path.display());
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}
