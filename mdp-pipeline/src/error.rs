use chrono::NaiveDate;
use mdp_data::model::ModelError;
use mdp_obs::ObservationError;
use mdp_utils::error::DateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller-supplied input was rejected.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The environment is not usable (empty registry, bad model artifact).
    #[error("configuration error: {0}")]
    Config(String),

    /// Every site of a batch failed; nothing was written.
    #[error("no site could be predicted for {date} ({attempted} attempted)")]
    BatchFailure { date: NaiveDate, attempted: usize },

    /// The model returned a value that cannot be stored (NaN or infinite).
    #[error("non-finite prediction: {0}")]
    Prediction(String),

    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<DateError> for PipelineError {
    fn from(e: DateError) -> Self {
        PipelineError::Validation(e.to_string())
    }
}

impl From<ModelError> for PipelineError {
    fn from(e: ModelError) -> Self {
        PipelineError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
