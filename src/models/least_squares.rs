//! Two-stage penalized least-squares decomposition
//!
//! Stage one fits the trend: a piecewise-linear basis with hinge terms at
//! changepoints, or the same basis in logit space for saturating growth.
//! Stage two fits yearly Fourier features and standardized regressor columns
//! against the detrended series. Prior scales enter as ridge strengths
//! (penalty = 1 / prior_scale^2), so a larger prior scale means a more
//! flexible term.

use crate::components::ComponentSeries;
use crate::config::{ForecastConfig, Growth, SeasonalityMode};
use crate::data::TimeSeriesPoint;
use crate::error::{ForecastError, Result};
use crate::math;
use crate::models::{DecompositionModel, FittedModel, ForecastPoint};
use crate::pipeline::FitBudget;
use crate::regressors::AlignedRegressor;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Upper bound on trend changepoints
const MAX_CHANGEPOINTS: usize = 25;
/// Fraction of the historical span eligible for changepoints
const CHANGEPOINT_RANGE: f64 = 0.8;
/// Harmonics in the yearly seasonal term
const FOURIER_ORDER: usize = 10;
/// Days per yearly cycle
const YEAR_DAYS: f64 = 365.25;
/// Mean days per month, used to convert date gaps into months ahead
const MONTH_DAYS: f64 = 30.4375;
/// Clamp applied before the logit transform
const LOGIT_EPS: f64 = 1e-6;
/// Smallest trend magnitude divisible in multiplicative mode
const TREND_FLOOR: f64 = 1e-9;

/// Least-squares decomposition model
#[derive(Debug, Clone)]
pub struct LeastSquaresDecomposition {
    name: String,
}

impl LeastSquaresDecomposition {
    /// Create a new decomposition model
    pub fn new() -> Self {
        Self {
            name: "Least Squares Decomposition".to_string(),
        }
    }
}

impl Default for LeastSquaresDecomposition {
    fn default() -> Self {
        Self::new()
    }
}

/// Fitted least-squares decomposition
#[derive(Debug, Clone)]
pub struct FittedLeastSquares {
    name: String,
    growth: Growth,
    seasonality_mode: SeasonalityMode,
    yearly: bool,
    start_date: NaiveDate,
    last_date: NaiveDate,
    span_days: f64,
    y_scale: f64,
    cap: Option<f64>,
    changepoints: Vec<f64>,
    trend_coef: Vec<f64>,
    seasonal_coef: Vec<f64>,
    regressor_coef: Vec<f64>,
    regressors: Vec<AlignedRegressor>,
    sigma: f64,
    z: f64,
}

impl DecompositionModel for LeastSquaresDecomposition {
    type Fitted = FittedLeastSquares;

    fn fit(
        &self,
        history: &[TimeSeriesPoint],
        regressors: &[AlignedRegressor],
        config: &ForecastConfig,
        budget: &FitBudget,
    ) -> Result<Self::Fitted> {
        budget.check()?;

        if history.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "At least two distinct dates are required to fit, got {}",
                history.len()
            )));
        }
        for pair in history.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataError(format!(
                    "Historical dates must be strictly ascending: {} followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        for regressor in regressors {
            if regressor.std() <= 0.0 {
                return Err(ForecastError::DegenerateRegressor {
                    name: regressor.name().to_string(),
                });
            }
        }

        let start_date = history[0].date;
        let last_date = history[history.len() - 1].date;
        let span_days = (last_date - start_date).num_days() as f64;
        let times: Vec<f64> = history
            .iter()
            .map(|p| (p.date - start_date).num_days() as f64 / span_days)
            .collect();
        let values: Vec<f64> = history.iter().map(|p| p.value).collect();

        let y_abs_max = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_abs_max > 0.0 { y_abs_max } else { 1.0 };

        let changepoints = changepoint_positions(history.len());

        // Stage one: trend on the piecewise-linear basis
        let trend_rows: Vec<Vec<f64>> = times.iter().map(|&t| trend_row(t, &changepoints)).collect();
        let changepoint_penalty = 1.0 / config.changepoint_prior_scale.powi(2);
        let mut trend_penalties = vec![changepoint_penalty; 2 + changepoints.len()];
        trend_penalties[0] = 0.0;
        trend_penalties[1] = 0.0;

        let (cap, trend_targets) = match config.growth {
            Growth::Linear => {
                let targets: Vec<f64> = values.iter().map(|v| v / y_scale).collect();
                (None, targets)
            }
            Growth::Logistic => {
                let y_max = values.iter().fold(f64::MIN, |acc, v| acc.max(*v));
                let y_min = values.iter().fold(f64::MAX, |acc, v| acc.min(*v));
                let mut cap = y_max + 0.1 * (y_max - y_min).max(1.0);
                if cap <= 0.0 {
                    cap = 1.0;
                }
                let targets: Vec<f64> = values
                    .iter()
                    .map(|&v| math::logit((v / cap).clamp(LOGIT_EPS, 1.0 - LOGIT_EPS)))
                    .collect();
                (Some(cap), targets)
            }
        };
        let trend_coef = math::ridge_solve(&trend_rows, &trend_targets, &trend_penalties)?;

        budget.check()?;

        let trend_values: Vec<f64> = times
            .iter()
            .map(|&t| {
                eval_trend(
                    t,
                    &changepoints,
                    &trend_coef,
                    config.growth,
                    y_scale,
                    cap,
                )
            })
            .collect();

        // Stage two: yearly seasonality and regressors on the detrended series
        let fourier_cols = if config.yearly_seasonality {
            2 * FOURIER_ORDER
        } else {
            0
        };
        let stage_two_cols = fourier_cols + regressors.len();
        let (seasonal_coef, regressor_coef) = if stage_two_cols == 0 {
            (Vec::new(), Vec::new())
        } else {
            let mut rows = Vec::with_capacity(history.len());
            let mut targets = Vec::with_capacity(history.len());
            for (i, point) in history.iter().enumerate() {
                let detrended = match config.seasonality_mode {
                    SeasonalityMode::Additive => (values[i] - trend_values[i]) / y_scale,
                    SeasonalityMode::Multiplicative => {
                        if trend_values[i].abs() < TREND_FLOOR {
                            return Err(ForecastError::DataError(format!(
                                "Multiplicative mode requires a nonzero trend, trend is ~0 on {}",
                                point.date
                            )));
                        }
                        values[i] / trend_values[i] - 1.0
                    }
                };
                targets.push(detrended);

                let mut row = Vec::with_capacity(stage_two_cols);
                if config.yearly_seasonality {
                    row.extend(math::fourier_features(
                        day_covariate(point.date),
                        FOURIER_ORDER,
                        YEAR_DAYS,
                    ));
                }
                for regressor in regressors {
                    row.push(regressor.standardized_on(point.date)?);
                }
                rows.push(row);
            }

            let mut penalties = vec![1.0 / config.seasonality_prior_scale.powi(2); fourier_cols];
            penalties
                .extend(vec![1.0 / config.regressor_prior_scale.powi(2); regressors.len()]);

            let coef = math::ridge_solve(&rows, &targets, &penalties)?;
            (
                coef[..fourier_cols].to_vec(),
                coef[fourier_cols..].to_vec(),
            )
        };

        let fitted = FittedLeastSquares {
            name: self.name.clone(),
            growth: config.growth,
            seasonality_mode: config.seasonality_mode,
            yearly: config.yearly_seasonality,
            start_date,
            last_date,
            span_days,
            y_scale,
            cap,
            changepoints,
            trend_coef,
            seasonal_coef,
            regressor_coef,
            regressors: regressors.to_vec(),
            sigma: 0.0,
            z: math::normal_z(config.interval_width)?,
        };

        // Residual spread of the in-sample fit drives the interval width
        let mut residuals = Vec::with_capacity(history.len());
        for point in history {
            residuals.push(point.value - fitted.predict_on(point.date)?);
        }

        Ok(FittedLeastSquares {
            sigma: math::rms(&residuals),
            ..fitted
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedLeastSquares {
    /// Point prediction on a single date
    fn predict_on(&self, date: NaiveDate) -> Result<f64> {
        let trend = self.trend_on(date);
        let seasonal = self.seasonal_factor(date);
        let regressor = self.regressor_factor(date)?;
        Ok(match self.seasonality_mode {
            SeasonalityMode::Additive => trend + self.y_scale * (seasonal + regressor),
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal + regressor),
        })
    }

    /// Trend value on a single date
    fn trend_on(&self, date: NaiveDate) -> f64 {
        let t = (date - self.start_date).num_days() as f64 / self.span_days;
        eval_trend(
            t,
            &self.changepoints,
            &self.trend_coef,
            self.growth,
            self.y_scale,
            self.cap,
        )
    }

    /// Dimensionless yearly seasonal factor
    fn seasonal_factor(&self, date: NaiveDate) -> f64 {
        if self.seasonal_coef.is_empty() {
            return 0.0;
        }
        let features = math::fourier_features(day_covariate(date), FOURIER_ORDER, YEAR_DAYS);
        dot(&self.seasonal_coef, &features)
    }

    /// Dimensionless combined regressor factor
    fn regressor_factor(&self, date: NaiveDate) -> Result<f64> {
        let mut factor = 0.0;
        for (coef, regressor) in self.regressor_coef.iter().zip(self.regressors.iter()) {
            factor += coef * regressor.standardized_on(date)?;
        }
        Ok(factor)
    }

    /// Interval half-width on a single date
    ///
    /// Zero at or before the last fitted date; grows with the square root of
    /// the number of months past it.
    fn half_width_on(&self, date: NaiveDate) -> f64 {
        if date <= self.last_date {
            return 0.0;
        }
        let months_ahead = (date - self.last_date).num_days() as f64 / MONTH_DAYS;
        self.z * self.sigma * months_ahead.sqrt()
    }

    /// Standard deviation of the in-sample residuals
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl FittedModel for FittedLeastSquares {
    fn evaluate(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        let mut points = Vec::with_capacity(dates.len());
        for &date in dates {
            let predicted = self.predict_on(date)?;
            points.push(ForecastPoint::new(date, predicted, self.half_width_on(date)));
        }
        Ok(points)
    }

    fn decompose(&self, dates: &[NaiveDate]) -> Result<ComponentSeries> {
        let mut trend = Vec::with_capacity(dates.len());
        let mut yearly = if self.yearly {
            Some(Vec::with_capacity(dates.len()))
        } else {
            None
        };
        let mut regressors: BTreeMap<String, Vec<TimeSeriesPoint>> = self
            .regressors
            .iter()
            .map(|r| (r.name().to_string(), Vec::with_capacity(dates.len())))
            .collect();

        for &date in dates {
            let trend_value = self.trend_on(date);
            trend.push(TimeSeriesPoint::new(date, trend_value));

            // Multiplicative contributions are reported scaled by the trend,
            // so the component sum reconstructs the prediction in both modes
            let unit = match self.seasonality_mode {
                SeasonalityMode::Additive => self.y_scale,
                SeasonalityMode::Multiplicative => trend_value,
            };

            if let Some(yearly) = yearly.as_mut() {
                yearly.push(TimeSeriesPoint::new(
                    date,
                    unit * self.seasonal_factor(date),
                ));
            }
            for (coef, regressor) in self.regressor_coef.iter().zip(self.regressors.iter()) {
                let contribution = unit * coef * regressor.standardized_on(date)?;
                if let Some(series) = regressors.get_mut(regressor.name()) {
                    series.push(TimeSeriesPoint::new(date, contribution));
                }
            }
        }

        Ok(ComponentSeries {
            trend,
            yearly,
            regressors,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Changepoint positions in scaled time, uniform over the eligible range
fn changepoint_positions(n: usize) -> Vec<f64> {
    let count = MAX_CHANGEPOINTS.min((n * 4 / 5).saturating_sub(1));
    (1..=count)
        .map(|j| CHANGEPOINT_RANGE * j as f64 / (count + 1) as f64)
        .collect()
}

/// Trend design row: intercept, slope and one hinge per changepoint
fn trend_row(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    for &cp in changepoints {
        row.push((t - cp).max(0.0));
    }
    row
}

/// Evaluate the trend basis at scaled time `t` and map back to data units
fn eval_trend(
    t: f64,
    changepoints: &[f64],
    coef: &[f64],
    growth: Growth,
    y_scale: f64,
    cap: Option<f64>,
) -> f64 {
    let raw = dot(coef, &trend_row(t, changepoints));
    match growth {
        Growth::Linear => y_scale * raw,
        Growth::Logistic => cap.unwrap_or(1.0) * math::sigmoid(raw),
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn day_covariate(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}
