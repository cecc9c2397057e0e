//! Prediction and aggregation pipeline.
//!
//! [`PredictionStore`] serves per-date prediction batches cache-first,
//! recomputing every registered site through the
//! [`orchestrator`] when a date's record set is incomplete.
//! [`aggregate::dashboard`] summarizes persisted predictions for the
//! operations dashboard.

pub mod aggregate;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod store;

pub use context::{PipelineConfig, PipelineContext};
pub use error::{PipelineError, Result};
pub use store::PredictionStore;

#[cfg(test)]
pub(crate) mod testing;
