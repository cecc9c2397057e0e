//! Command implementations for the MDP CLI.
//!
//! Provides subcommands for setting up the site registry, computing daily
//! predictions (single dates or backfills), ad-hoc point predictions and the
//! monthly dashboard.

use clap::Subcommand;

pub mod backfill;
pub mod dashboard;
pub mod predict;
pub mod settings;
pub mod setup;

pub use settings::Settings;

#[derive(Subcommand)]
pub enum Command {
    /// Create the database schema and load the site registry
    InitDb {
        /// Sites CSV (name,latitude,longitude,description); defaults to the bundled Jeju beaches
        #[arg(short = 's', long)]
        sites: Option<String>,
    },

    /// Predictions for every site on a date, computed only if not already stored
    Predict {
        /// Date as YYYY-MM-DD (default: today, observed now)
        #[arg(short = 'd', long)]
        date: Option<String>,
    },

    /// Predict debris for arbitrary coordinates without storing anything
    PredictPoint {
        /// Local timestamp, e.g. 2016-01-05T15:20:00
        #[arg(long)]
        at: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Monthly dashboard: totals, trend and ranked risk areas
    Dashboard {
        /// Reference day as YYYY-MM-DD (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Fill predictions for a range of past dates
    Backfill {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last date (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: String,

        /// Only the first day of each month in the range
        #[arg(long)]
        monthly: bool,

        /// Pause between dates in milliseconds
        #[arg(long, default_value_t = 500)]
        pause_ms: u64,
    },
}

pub async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::InitDb { sites } => setup::run_init_db(settings, sites.as_deref()),
        Command::Predict { date } => predict::run_predict(settings, date.as_deref()).await,
        Command::PredictPoint { at, lat, lon } => {
            predict::run_predict_point(settings, &at, lat, lon).await
        }
        Command::Dashboard { as_of } => dashboard::run_dashboard(settings, as_of.as_deref()),
        Command::Backfill {
            start,
            end,
            monthly,
            pause_ms,
        } => backfill::run_backfill(settings, &start, &end, monthly, pause_ms).await,
    }
}
