//! Error types for the demand_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A request field failed validation
    #[error("Validation error for '{field}': {message}")]
    ValidationError { field: String, message: String },

    /// A requested regressor is not present in the series store
    #[error("Unknown regressor: '{name}'")]
    UnknownRegressor { name: String },

    /// A selected regressor is missing a value for a required date
    #[error("Regressor '{regressor}' has no value for {date}")]
    InsufficientRegressorCoverage { regressor: String, date: NaiveDate },

    /// The historical series is too sparse to fit
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A selected regressor carries no information over the historical window
    #[error("Regressor '{name}' is constant over the historical window")]
    DegenerateRegressor { name: String },

    /// A fit exceeded its time budget or was cancelled
    #[error("Fit exceeded its time budget")]
    FitTimeout,

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
