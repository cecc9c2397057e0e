//! Global options shared by every subcommand.
//!
//! Each option can also be supplied through the environment variable named
//! next to it.

use anyhow::{anyhow, Context};
use clap::Args;
use mdp_db::Database;
use mdp_obs::client::{ObservationClient, ObservationConfig};
use mdp_pipeline::{PipelineConfig, PipelineContext, PredictionStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// SQLite database file
    #[arg(long, env = "MDP_DATABASE", default_value = "mdp.sqlite3", global = true)]
    pub database: PathBuf,

    /// Regression model artifact (JSON)
    #[arg(long, env = "MODEL_PATH", global = true)]
    pub model_path: Option<PathBuf>,

    /// Ocean current grid endpoint
    #[arg(long, env = "CURRENT_API_URL", global = true)]
    pub current_api_url: Option<String>,

    #[arg(long, env = "CURRENT_API_KEY", hide_env_values = true, global = true)]
    pub current_api_key: Option<String>,

    /// Wind station endpoint
    #[arg(long, env = "WIND_API_URL", global = true)]
    pub wind_api_url: Option<String>,

    #[arg(long, env = "WIND_API_KEY", hide_env_values = true, global = true)]
    pub wind_api_key: Option<String>,

    /// Water temperature grid endpoint (optional)
    #[arg(long, env = "TEMPERATURE_API_URL", global = true)]
    pub temperature_api_url: Option<String>,

    #[arg(long, env = "TEMPERATURE_API_KEY", hide_env_values = true, global = true)]
    pub temperature_api_key: Option<String>,

    /// Per-request timeout for provider calls
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub http_timeout_secs: u64,

    /// Sites computed concurrently within a batch
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = 4, global = true)]
    pub max_concurrency: usize,
}

fn required(value: &Option<String>, flag: &str) -> anyhow::Result<String> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("configuration error: --{} is required", flag))
}

impl Settings {
    pub fn open_database(&self) -> anyhow::Result<Database> {
        Database::open(&self.database)
            .with_context(|| format!("cannot open database {}", self.database.display()))
    }

    pub fn observation_config(&self) -> anyhow::Result<ObservationConfig> {
        Ok(ObservationConfig {
            current_url: required(&self.current_api_url, "current-api-url")?,
            current_key: required(&self.current_api_key, "current-api-key")?,
            wind_url: required(&self.wind_api_url, "wind-api-url")?,
            wind_key: required(&self.wind_api_key, "wind-api-key")?,
            temperature_url: self.temperature_api_url.clone(),
            temperature_key: self.temperature_api_key.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_concurrency: self.max_concurrency,
        }
    }

    /// Database, model and HTTP client wired into a pipeline context.
    pub fn pipeline_context(&self) -> anyhow::Result<PipelineContext> {
        let model_path = self
            .model_path
            .as_ref()
            .ok_or_else(|| anyhow!("configuration error: --model-path is required"))?;
        let client = ObservationClient::new(self.observation_config()?)?;
        let context = PipelineContext::with_model_path(
            self.open_database()?,
            model_path,
            Arc::new(client),
            self.pipeline_config(),
        )?;
        Ok(context)
    }

    pub fn prediction_store(&self) -> anyhow::Result<PredictionStore> {
        Ok(PredictionStore::new(Arc::new(self.pipeline_context()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["mdp"]).unwrap();
        assert_eq!(cli.settings.http_timeout_secs, 30);
        assert_eq!(cli.settings.max_concurrency, 4);
        assert_eq!(cli.settings.pipeline_config().max_concurrency, 4);
    }

    #[test]
    fn test_observation_config_requires_endpoints() {
        let cli = TestCli::try_parse_from([
            "mdp",
            "--current-api-url",
            "http://currents.test",
            "--current-api-key",
            "abc",
        ])
        .unwrap();
        assert!(cli.settings.observation_config().is_err());
    }

    #[test]
    fn test_observation_config_from_flags() {
        let cli = TestCli::try_parse_from([
            "mdp",
            "--current-api-url",
            "http://currents.test",
            "--current-api-key",
            "abc",
            "--wind-api-url",
            "http://wind.test",
            "--wind-api-key",
            "def",
            "--http-timeout-secs",
            "5",
        ])
        .unwrap();
        let config = cli.settings.observation_config().unwrap();
        assert_eq!(config.wind_url, "http://wind.test");
        assert_eq!(config.temperature_url, None);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_model_path_is_reported() {
        let cli = TestCli::try_parse_from(["mdp", "--database", ":memory:"]).unwrap();
        let err = cli.settings.pipeline_context().err().unwrap();
        assert!(err.to_string().contains("model-path"));
    }
}
