//! # Demand Forecast
//!
//! A Rust library for emergency transport demand forecasting built around a
//! decomposable time series model with trend, yearly seasonality and
//! extra-regressor components.
//!
//! ## Features
//!
//! - Validated forecast configuration (growth, seasonality mode, prior scales)
//! - Exact-date regressor alignment over the historical and future grids
//! - Decomposition models (piecewise-linear and logistic trend, yearly Fourier seasonality)
//! - Per-date component extraction (trend, yearly, each regressor)
//! - Rolling-origin cross-validation with mape, mae, rmse and interval coverage
//! - Single-flight result caching keyed by data snapshot and configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use demand_forecast::contract::{ApiResponse, ForecastRequest};
//! use demand_forecast::data::SeriesStore;
//! use demand_forecast::pipeline::{run_forecast, FitBudget};
//! use demand_forecast::synthetic;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Three years of synthetic monthly demand
//!     let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//!     let history = synthetic::linear_series(start, 36, 120.0, 2.5, 4.0, 7);
//!     let store = SeriesStore::new(history, Vec::new())?;
//!
//!     // Forecast a year ahead with the default configuration
//!     let request = ForecastRequest {
//!         horizon_periods: Some(12),
//!         ..ForecastRequest::default()
//!     };
//!     let result = run_forecast(&store, &request, &FitBudget::unlimited())?;
//!
//!     for point in result.forecast_data() {
//!         println!(
//!             "{}: {:.1} [{:.1}, {:.1}]",
//!             point.date, point.predicted, point.lower, point.upper
//!         );
//!     }
//!
//!     let response = ApiResponse::success(&result);
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod cache;
pub mod components;
pub mod config;
pub mod contract;
pub mod crossval;
pub mod data;
pub mod error;
pub mod math;
pub mod models;
pub mod pipeline;
pub mod regressors;
pub mod synthetic;

// Re-export commonly used types
pub use crate::assemble::{ForecastResult, ResultAssembler};
pub use crate::cache::ForecastCache;
pub use crate::components::{ComponentDecomposer, ComponentSeries};
pub use crate::config::{ForecastConfig, Growth, SeasonalityMode};
pub use crate::contract::{ApiResponse, ForecastRequest};
pub use crate::crossval::{CrossValidator, CvMetrics};
pub use crate::data::{DataLoader, RegressorSeries, SeriesStore, TimeSeriesPoint};
pub use crate::error::{ForecastError, Result};
pub use crate::models::least_squares::LeastSquaresDecomposition;
pub use crate::models::{DecompositionModel, FittedModel, ForecastPoint};
pub use crate::pipeline::{run_forecast, run_forecast_with_model, FitBudget};
pub use crate::regressors::{AlignedRegressor, RegressorAssembler};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
