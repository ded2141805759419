//! End-to-end forecast request orchestration

use crate::assemble::{ForecastResult, ResultAssembler};
use crate::components::ComponentDecomposer;
use crate::config::ForecastConfig;
use crate::contract::ForecastRequest;
use crate::crossval::CrossValidator;
use crate::data::{future_month_dates, SeriesStore};
use crate::error::{ForecastError, Result};
use crate::models::least_squares::LeastSquaresDecomposition;
use crate::models::{DecompositionModel, FittedModel};
use crate::regressors::RegressorAssembler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cooperative time budget shared by every fit a request performs
///
/// Cloning shares the cancellation flag, so a clone handed to another
/// thread can cancel the original. Checks are cheap and performed at stage
/// boundaries and per cross-validation fold.
#[derive(Debug, Clone, Default)]
pub struct FitBudget {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl FitBudget {
    /// A budget that never expires
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    /// Cancel the work sharing this budget
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Fail with `FitTimeout` once expired or cancelled
    pub fn check(&self) -> Result<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(ForecastError::FitTimeout);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ForecastError::FitTimeout);
            }
        }
        Ok(())
    }
}

/// Run the full forecasting pipeline with the default decomposition model
pub fn run_forecast(
    store: &SeriesStore,
    request: &ForecastRequest,
    budget: &FitBudget,
) -> Result<ForecastResult> {
    run_forecast_with_model(store, request, &LeastSquaresDecomposition::new(), budget)
}

/// Run the full forecasting pipeline with a caller-provided model
///
/// Stages run in order: request validation, regressor alignment, model fit,
/// component extraction, rolling-origin cross-validation, result assembly.
/// The store is read-only throughout; everything else is request-scoped.
pub fn run_forecast_with_model<M>(
    store: &SeriesStore,
    request: &ForecastRequest,
    model: &M,
    budget: &FitBudget,
) -> Result<ForecastResult>
where
    M: DecompositionModel + Sync,
{
    budget.check()?;
    let config = ForecastConfig::from_request(request, store)?;
    debug!(
        growth = %config.growth,
        mode = %config.seasonality_mode,
        horizon = config.horizon_periods,
        regressors = config.extra_regressor_names.len(),
        "forecast request validated"
    );

    let last_date = store.last_date().ok_or_else(|| {
        ForecastError::InsufficientData("The historical series is empty".to_string())
    })?;
    let historical_dates = store.history_dates();
    let future_dates = future_month_dates(last_date, config.horizon_periods)?;

    let regressors =
        RegressorAssembler::assemble(store, &config, &historical_dates, &future_dates)?;
    budget.check()?;

    let fitted = model.fit(store.history(), &regressors, &config, budget)?;
    info!(model = model.name(), points = store.len(), "model fit complete");

    let grid = ResultAssembler::date_grid(&historical_dates, &future_dates);
    let forecast_data = fitted.evaluate(&grid)?;
    let components = ComponentDecomposer::decompose(&fitted, &grid)?;
    budget.check()?;

    let cv_metrics =
        CrossValidator::new().run(model, store.history(), &regressors, &config, budget)?;

    let result = ResultAssembler::assemble(store.history(), forecast_data, components, cv_metrics)?;
    info!(points = result.forecast_data().len(), "forecast assembled");
    Ok(result)
}
