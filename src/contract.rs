//! Stable JSON contract between the pipeline and the HTTP layer
//!
//! The chart layer binds to these exact field names, so the payload shapes
//! here are part of the public interface and must not drift.

use crate::assemble::ForecastResult;
use crate::components::ComponentSeries;
use crate::crossval::CvMetrics;
use crate::data::TimeSeriesPoint;
use crate::error::ForecastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw forecast request as received from the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Names of the regressors to include in the model
    #[serde(default)]
    pub extra_vars: Vec<String>,
    /// Trend growth family: "linear" or "logistic"
    pub growth: String,
    /// Whether to fit the yearly seasonal term
    pub yearly_seasonality: bool,
    /// Effect composition: "additive" or "multiplicative"
    pub seasonality_mode: String,
    /// Trend flexibility prior scale
    pub changepoint_prior_scale: f64,
    /// Seasonal amplitude prior scale
    pub seasonality_prior_scale: f64,
    /// Central uncertainty interval width
    pub interval_width: f64,
    /// Regressor coefficient prior scale
    pub regressor_prior_scale: f64,
    /// Months to forecast past the last historical date; defaults to a year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_periods: Option<usize>,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            extra_vars: Vec::new(),
            growth: "linear".to_string(),
            yearly_seasonality: true,
            seasonality_mode: "additive".to_string(),
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
            regressor_prior_scale: 10.0,
            horizon_periods: None,
        }
    }
}

/// Response envelope returned to the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    /// Successful forecast carrying the full payload
    Success { data: ForecastData },
    /// Failed request with a human-readable message
    Error { message: String },
}

impl ApiResponse {
    /// Wrap a completed forecast
    pub fn success(result: &ForecastResult) -> Self {
        ApiResponse::Success {
            data: ForecastData::from_result(result),
        }
    }

    /// Wrap a pipeline failure
    pub fn error(error: &ForecastError) -> Self {
        ApiResponse::Error {
            message: error.to_string(),
        }
    }

    /// Wrap a pipeline outcome either way
    pub fn from_result(result: &crate::error::Result<ForecastResult>) -> Self {
        match result {
            Ok(forecast) => ApiResponse::success(forecast),
            Err(error) => ApiResponse::error(error),
        }
    }
}

/// Forecast payload shaped for the chart layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastData {
    /// Historical observations
    pub historical_actual: Vec<HistoricalPoint>,
    /// In-sample fit and future forecast over the full date grid
    pub forecast_data: Vec<ForecastPointPayload>,
    /// Separable component series
    pub components: ComponentsPayload,
    /// Cross-validation accuracy, absent when the history was too short
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_metrics: Option<CvMetricsPayload>,
}

impl ForecastData {
    /// Convert a pipeline result into the wire shape
    pub fn from_result(result: &ForecastResult) -> Self {
        Self {
            historical_actual: result
                .historical_actual()
                .iter()
                .map(|p| HistoricalPoint {
                    date: p.date,
                    actual: p.value,
                })
                .collect(),
            forecast_data: result
                .forecast_data()
                .iter()
                .map(|p| ForecastPointPayload {
                    date: p.date,
                    predicted: p.predicted,
                    lower: p.lower,
                    upper: p.upper,
                })
                .collect(),
            components: ComponentsPayload::from_series(result.components()),
            cv_metrics: result.cv_metrics().map(CvMetricsPayload::from_metrics),
        }
    }
}

/// One historical observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub actual: f64,
}

/// One dated prediction with its interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPointPayload {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// One dated component value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentPointPayload {
    pub date: NaiveDate,
    pub value: f64,
}

/// Component series keyed the way the chart layer expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentsPayload {
    pub trend: Vec<ComponentPointPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly: Option<Vec<ComponentPointPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_regressors: Option<BTreeMap<String, Vec<ComponentPointPayload>>>,
}

impl ComponentsPayload {
    fn from_series(series: &ComponentSeries) -> Self {
        let extra_regressors = if series.regressors.is_empty() {
            None
        } else {
            Some(
                series
                    .regressors
                    .iter()
                    .map(|(name, points)| (name.clone(), component_points(points)))
                    .collect(),
            )
        };

        Self {
            trend: component_points(&series.trend),
            yearly: series.yearly.as_deref().map(component_points),
            extra_regressors,
        }
    }
}

/// Cross-validation metrics on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvMetricsPayload {
    pub mape: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
}

impl CvMetricsPayload {
    fn from_metrics(metrics: &CvMetrics) -> Self {
        Self {
            mape: metrics.mape,
            mae: metrics.mae,
            rmse: metrics.rmse,
            coverage: metrics.coverage,
        }
    }
}

fn component_points(points: &[TimeSeriesPoint]) -> Vec<ComponentPointPayload> {
    points
        .iter()
        .map(|p| ComponentPointPayload {
            date: p.date,
            value: p.value,
        })
        .collect()
}
