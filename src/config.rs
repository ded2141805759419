//! Forecast request validation and the typed configuration it produces

use crate::contract::ForecastRequest;
use crate::data::SeriesStore;
use crate::error::{ForecastError, Result};
use std::fmt;
use std::str::FromStr;

/// Horizon applied when a request does not specify one
pub const DEFAULT_HORIZON_PERIODS: usize = 12;
/// Longest supported horizon (ten years of monthly periods)
pub const MAX_HORIZON_PERIODS: usize = 120;

/// Trend growth family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Piecewise-linear trend with changepoints
    Linear,
    /// Trend saturating toward a capacity inferred from the observed range
    Logistic,
}

impl FromStr for Growth {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Growth::Linear),
            "logistic" => Ok(Growth::Logistic),
            other => Err(ForecastError::ValidationError {
                field: "growth".to_string(),
                message: format!("must be 'linear' or 'logistic', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Linear => write!(f, "linear"),
            Growth::Logistic => write!(f, "logistic"),
        }
    }
}

/// How seasonal and regressor effects combine with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    /// Effects are added to the trend
    Additive,
    /// Effects scale the trend
    Multiplicative,
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "additive" => Ok(SeasonalityMode::Additive),
            "multiplicative" => Ok(SeasonalityMode::Multiplicative),
            other => Err(ForecastError::ValidationError {
                field: "seasonality_mode".to_string(),
                message: format!("must be 'additive' or 'multiplicative', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonalityMode::Additive => write!(f, "additive"),
            SeasonalityMode::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

/// Validated, immutable forecast configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Trend growth family
    pub growth: Growth,
    /// Selected regressor names, deduplicated in request order
    pub extra_regressor_names: Vec<String>,
    /// Whether the yearly seasonal term is fit
    pub yearly_seasonality: bool,
    /// Additive or multiplicative composition
    pub seasonality_mode: SeasonalityMode,
    /// Trend flexibility (larger allows sharper slope shifts)
    pub changepoint_prior_scale: f64,
    /// Seasonal amplitude regularization strength
    pub seasonality_prior_scale: f64,
    /// Regressor coefficient regularization strength
    pub regressor_prior_scale: f64,
    /// Central uncertainty interval width, in (0, 1)
    pub interval_width: f64,
    /// Months to forecast past the last historical date
    pub horizon_periods: usize,
}

impl ForecastConfig {
    /// Validate a raw request against the known regressors of a store
    pub fn from_request(request: &ForecastRequest, store: &SeriesStore) -> Result<Self> {
        let growth = request.growth.parse::<Growth>()?;
        let seasonality_mode = request.seasonality_mode.parse::<SeasonalityMode>()?;

        let changepoint_prior_scale =
            validate_prior("changepoint_prior_scale", request.changepoint_prior_scale)?;
        let seasonality_prior_scale =
            validate_prior("seasonality_prior_scale", request.seasonality_prior_scale)?;
        let regressor_prior_scale =
            validate_prior("regressor_prior_scale", request.regressor_prior_scale)?;

        let interval_width = request.interval_width;
        if !interval_width.is_finite() || interval_width <= 0.0 || interval_width >= 1.0 {
            return Err(ForecastError::ValidationError {
                field: "interval_width".to_string(),
                message: format!(
                    "must be strictly between 0 and 1, got {}",
                    interval_width
                ),
            });
        }

        let horizon_periods = request.horizon_periods.unwrap_or(DEFAULT_HORIZON_PERIODS);
        if horizon_periods > MAX_HORIZON_PERIODS {
            return Err(ForecastError::ValidationError {
                field: "horizon_periods".to_string(),
                message: format!(
                    "must be at most {}, got {}",
                    MAX_HORIZON_PERIODS, horizon_periods
                ),
            });
        }

        let mut extra_regressor_names: Vec<String> = Vec::new();
        for name in &request.extra_vars {
            if extra_regressor_names.iter().any(|known| known == name) {
                continue;
            }
            if store.regressor(name).is_none() {
                return Err(ForecastError::UnknownRegressor { name: name.clone() });
            }
            extra_regressor_names.push(name.clone());
        }

        Ok(Self {
            growth,
            extra_regressor_names,
            yearly_seasonality: request.yearly_seasonality,
            seasonality_mode,
            changepoint_prior_scale,
            seasonality_prior_scale,
            regressor_prior_scale,
            interval_width,
            horizon_periods,
        })
    }
}

fn validate_prior(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ForecastError::ValidationError {
            field: field.to_string(),
            message: format!("must be a finite number greater than zero, got {}", value),
        });
    }
    Ok(value)
}
