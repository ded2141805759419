//! Rolling-origin cross-validation of decomposition models

use crate::config::ForecastConfig;
use crate::data::TimeSeriesPoint;
use crate::error::{ForecastError, Result};
use crate::math;
use crate::models::{DecompositionModel, FittedModel};
use crate::pipeline::FitBudget;
use crate::regressors::AlignedRegressor;
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::debug;

/// Out-of-sample accuracy estimates pooled across folds
#[derive(Debug, Clone, PartialEq)]
pub struct CvMetrics {
    /// Mean absolute percentage error as a fraction; held-out points with an
    /// actual of zero are excluded, and a pool with every point excluded
    /// reports 0.0
    pub mape: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean square error
    pub rmse: f64,
    /// Fraction of held-out actuals inside their predicted interval
    pub coverage: Option<f64>,
}

/// One scored cross-validation fold
struct FoldScore {
    origin: usize,
    points: Vec<HeldOutPoint>,
}

struct HeldOutPoint {
    actual: f64,
    predicted: f64,
    lower: f64,
    upper: f64,
}

/// Rolling-origin cross-validator with an expanding training window
///
/// Each fold fits on a historical prefix and scores the immediately
/// following held-out window; the origin advances by a fixed stride until
/// the series is exhausted. A trailing window shorter than the holdout
/// length still forms a final fold.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    min_train: usize,
    holdout: usize,
    stride: usize,
}

impl CrossValidator {
    /// Smallest training prefix, one year of monthly observations
    pub const MIN_TRAIN_POINTS: usize = 12;
    /// Held-out window length per fold
    pub const HOLDOUT_POINTS: usize = 6;
    /// Origin advance between folds
    pub const STRIDE: usize = 6;

    /// Create a cross-validator with the default monthly windows
    pub fn new() -> Self {
        Self {
            min_train: Self::MIN_TRAIN_POINTS,
            holdout: Self::HOLDOUT_POINTS,
            stride: Self::STRIDE,
        }
    }

    /// Create a cross-validator with explicit window sizes
    pub fn with_windows(min_train: usize, holdout: usize, stride: usize) -> Result<Self> {
        for (field, value) in [
            ("min_train", min_train),
            ("holdout", holdout),
            ("stride", stride),
        ] {
            if value == 0 {
                return Err(ForecastError::ValidationError {
                    field: field.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(Self {
            min_train,
            holdout,
            stride,
        })
    }

    /// Backtest the model over every fold the history allows
    ///
    /// Returns `Ok(None)` when the history is too short to produce a single
    /// fold; the caller then reports the forecast without accuracy metrics.
    /// Folds fit in parallel and are pooled in origin order, so the result
    /// is deterministic for identical inputs.
    pub fn run<M>(
        &self,
        model: &M,
        history: &[TimeSeriesPoint],
        regressors: &[AlignedRegressor],
        config: &ForecastConfig,
        budget: &FitBudget,
    ) -> Result<Option<CvMetrics>>
    where
        M: DecompositionModel + Sync,
    {
        let folds = fold_bounds(history.len(), self.min_train, self.holdout, self.stride);
        if folds.is_empty() {
            debug!(
                points = history.len(),
                min_train = self.min_train,
                "insufficient history for cross-validation"
            );
            return Ok(None);
        }
        budget.check()?;

        let scored: Vec<Result<FoldScore>> = folds
            .par_iter()
            .map(|&(train_end, holdout_end)| -> Result<FoldScore> {
                budget.check()?;
                let fitted = model.fit(&history[..train_end], regressors, config, budget)?;
                let holdout_dates: Vec<NaiveDate> = history[train_end..holdout_end]
                    .iter()
                    .map(|p| p.date)
                    .collect();
                let forecast = fitted.evaluate(&holdout_dates)?;

                let points = history[train_end..holdout_end]
                    .iter()
                    .zip(forecast.iter())
                    .map(|(actual, predicted)| HeldOutPoint {
                        actual: actual.value,
                        predicted: predicted.predicted,
                        lower: predicted.lower,
                        upper: predicted.upper,
                    })
                    .collect();
                Ok(FoldScore {
                    origin: train_end,
                    points,
                })
            })
            .collect();

        let mut completed = Vec::with_capacity(scored.len());
        for fold in scored {
            completed.push(fold?);
        }
        completed.sort_by_key(|fold| fold.origin);

        let metrics = pool_metrics(&completed);
        debug!(
            folds = completed.len(),
            mape = metrics.mape,
            mae = metrics.mae,
            rmse = metrics.rmse,
            "cross-validation complete"
        );
        Ok(Some(metrics))
    }
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Training/holdout boundaries for each fold
fn fold_bounds(n: usize, min_train: usize, holdout: usize, stride: usize) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut train_end = min_train;
    while train_end < n {
        bounds.push((train_end, (train_end + holdout).min(n)));
        train_end += stride;
    }
    bounds
}

/// Pool per-point errors across folds into one metrics object
fn pool_metrics(folds: &[FoldScore]) -> CvMetrics {
    let mut errors = Vec::new();
    let mut abs_errors = Vec::new();
    let mut pct_errors = Vec::new();
    let mut inside = 0usize;
    let mut total = 0usize;

    for fold in folds {
        for point in &fold.points {
            let error = point.actual - point.predicted;
            errors.push(error);
            abs_errors.push(error.abs());
            if point.actual != 0.0 {
                pct_errors.push(error.abs() / point.actual.abs());
            }
            if point.actual >= point.lower && point.actual <= point.upper {
                inside += 1;
            }
            total += 1;
        }
    }

    let mape = if pct_errors.is_empty() {
        0.0
    } else {
        math::mean(&pct_errors)
    };
    let coverage = if total > 0 {
        Some(inside as f64 / total as f64)
    } else {
        None
    };

    CvMetrics {
        mape,
        mae: math::mean(&abs_errors),
        rmse: math::rms(&errors),
        coverage,
    }
}
