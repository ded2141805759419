//! Assembly of the final, date-keyed forecast result

use crate::components::ComponentSeries;
use crate::crossval::CvMetrics;
use crate::data::TimeSeriesPoint;
use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use chrono::NaiveDate;

/// The complete output of one forecast request
///
/// `forecast_data` spans the historical dates and the future horizon, each
/// date appearing exactly once in ascending order. `cv_metrics` is absent
/// when the history was too short for a single cross-validation fold.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    historical_actual: Vec<TimeSeriesPoint>,
    forecast_data: Vec<ForecastPoint>,
    components: ComponentSeries,
    cv_metrics: Option<CvMetrics>,
}

impl ForecastResult {
    /// The historical observations the model was fit on
    pub fn historical_actual(&self) -> &[TimeSeriesPoint] {
        &self.historical_actual
    }

    /// In-sample fit and future forecast over the full date grid
    pub fn forecast_data(&self) -> &[ForecastPoint] {
        &self.forecast_data
    }

    /// Separable component series over the full date grid
    pub fn components(&self) -> &ComponentSeries {
        &self.components
    }

    /// Cross-validation accuracy, when enough history was available
    pub fn cv_metrics(&self) -> Option<&CvMetrics> {
        self.cv_metrics.as_ref()
    }
}

/// Merges pipeline outputs into one ordered result
#[derive(Debug)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// The union of historical and future dates, deduplicated and ascending
    pub fn date_grid(historical: &[NaiveDate], future: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut grid: Vec<NaiveDate> = historical.iter().chain(future.iter()).copied().collect();
        grid.sort_unstable();
        grid.dedup();
        grid
    }

    /// Pack the pipeline outputs, checking the date-grid invariants
    pub fn assemble(
        history: &[TimeSeriesPoint],
        forecast_data: Vec<ForecastPoint>,
        components: ComponentSeries,
        cv_metrics: Option<CvMetrics>,
    ) -> Result<ForecastResult> {
        for pair in forecast_data.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataError(format!(
                    "Forecast dates must be strictly ascending: {} followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        if components.len() != forecast_data.len() {
            return Err(ForecastError::DataError(format!(
                "Component series cover {} dates for {} forecast points",
                components.len(),
                forecast_data.len()
            )));
        }

        Ok(ForecastResult {
            historical_actual: history.to_vec(),
            forecast_data,
            components,
            cv_metrics,
        })
    }
}
