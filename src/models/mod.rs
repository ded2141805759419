//! Decomposition models for demand forecasting

use crate::components::ComponentSeries;
use crate::config::ForecastConfig;
use crate::data::TimeSeriesPoint;
use crate::error::Result;
use crate::pipeline::FitBudget;
use crate::regressors::AlignedRegressor;
use chrono::NaiveDate;
use std::fmt::Debug;

/// A dated point prediction with its uncertainty interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// Calendar date of the prediction
    pub date: NaiveDate,
    /// Point prediction
    pub predicted: f64,
    /// Lower interval bound
    pub lower: f64,
    /// Upper interval bound
    pub upper: f64,
}

impl ForecastPoint {
    /// Build a point from a prediction and a non-negative interval half-width
    pub fn new(date: NaiveDate, predicted: f64, half_width: f64) -> Self {
        let half_width = half_width.max(0.0);
        Self {
            date,
            predicted,
            lower: predicted - half_width,
            upper: predicted + half_width,
        }
    }
}

/// A decomposition model fitted to one historical series
pub trait FittedModel: Debug {
    /// Evaluate predictions with uncertainty bounds over a date range
    fn evaluate(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>>;

    /// Evaluate the separable components over a date range
    fn decompose(&self, dates: &[NaiveDate]) -> Result<ComponentSeries>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// A decomposition model that can be fit to a series under a configuration
pub trait DecompositionModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit trend, seasonality and regressor terms to the historical series
    fn fit(
        &self,
        history: &[TimeSeriesPoint],
        regressors: &[AlignedRegressor],
        config: &ForecastConfig,
        budget: &FitBudget,
    ) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod least_squares;
