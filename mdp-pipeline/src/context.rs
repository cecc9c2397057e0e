//! Explicitly constructed dependencies shared by every pipeline operation.

use crate::error::Result;
use mdp_data::model::{load_model, RegressionModel};
use mdp_db::Database;
use mdp_obs::ObservationSource;
use std::path::Path;
use std::sync::Arc;

/// Default number of sites computed concurrently within a batch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on in-flight site computations per batch (at least 1).
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Database, model, and observation source a pipeline runs against.
pub struct PipelineContext {
    pub db: Database,
    pub model: Arc<dyn RegressionModel>,
    pub source: Arc<dyn ObservationSource>,
    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        db: Database,
        model: Arc<dyn RegressionModel>,
        source: Arc<dyn ObservationSource>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            db,
            model,
            source,
            config,
        }
    }

    /// Build a context, loading the model artifact from `model_path`.
    ///
    /// A missing or malformed artifact is a [`crate::PipelineError::Config`].
    pub fn with_model_path(
        db: Database,
        model_path: &Path,
        source: Arc<dyn ObservationSource>,
        config: PipelineConfig,
    ) -> Result<Self> {
        let model: Arc<dyn RegressionModel> = Arc::from(load_model(model_path)?);
        Ok(Self::new(db, model, source, config))
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.config.max_concurrency.max(1)
    }
}
