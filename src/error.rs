//! Error types for ablate-db
//!
//! Only malformed requests are errors. Missing data degrades silently to
//! `Scalar::Null`, an infinite sentinel, or NaN.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ablate-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// Metric direction other than `min`/`max`
    #[error("Invalid direction: '{0}'. Must be 'min' or 'max'.")]
    InvalidDirection(String),

    /// Temporal reduction outside the supported set
    #[error("Invalid reduction method: '{0}'. Must be 'min', 'max', 'first', or 'last'.")]
    InvalidReduction(String),

    /// Aggregation method outside the supported set
    #[error(
        "Unsupported aggregation method: '{0}'. Must be 'first', 'last', 'best', 'worst', or 'mean'."
    )]
    UnsupportedAggregation(String),

    /// `best`/`worst` aggregation requested without a metric to rank by
    #[error("Method '{method}' requires a metric to be specified for comparison.")]
    MissingObjective {
        /// The aggregation method that needed the metric
        method: String,
    },

    /// IO error while loading runs
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed run encoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
