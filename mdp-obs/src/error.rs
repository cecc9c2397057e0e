/// Error types for observation lookups
use thiserror::Error;

/// Main error type for observation-provider operations
#[derive(Error, Debug)]
pub enum ObservationError {
    /// The provider answered but no sample survived filtering or matching
    #[error("No usable observation: {0}")]
    NoData(String),

    /// The provider reported failure or returned a malformed payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP request failed (connection, timeout, body read)
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The embedded station table could not be parsed
    #[error("Failed to parse station table: {0}")]
    StationTable(#[from] csv::Error),
}

/// Type alias for Results using ObservationError
pub type Result<T> = std::result::Result<T, ObservationError>;
