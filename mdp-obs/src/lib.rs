//! Observation types and provider client for the marine debris pipeline.
//!
//! Everything except [`client`] is plain parsing and matching so it builds
//! without the HTTP stack; enable the `api` feature for the reqwest client.

pub mod current;
pub mod error;
pub mod observation;
pub mod source;
pub mod station;
pub mod temperature;
pub mod wind;

#[cfg(feature = "api")]
pub mod client;

pub use error::{ObservationError, Result};
pub use observation::VectorObservation;
pub use source::ObservationSource;
