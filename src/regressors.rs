//! Selection and alignment of exogenous regressors

use crate::config::ForecastConfig;
use crate::data::SeriesStore;
use crate::error::{ForecastError, Result};
use crate::math;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A selected regressor aligned to the historical and future date grids
///
/// Values are kept raw; `mean` and `std` describe the historical window and
/// are fixed at assembly time so cross-validation folds standardize against
/// the same parameters as the full fit.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRegressor {
    name: String,
    values: BTreeMap<NaiveDate, f64>,
    mean: f64,
    std: f64,
}

impl AlignedRegressor {
    /// Name of the regressor
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Historical mean used for standardization
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Historical standard deviation used for standardization
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Raw value on a date within the aligned grid
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Standardized value on a date within the aligned grid
    pub fn standardized_on(&self, date: NaiveDate) -> Result<f64> {
        let value = self.values.get(&date).copied().ok_or_else(|| {
            ForecastError::InsufficientRegressorCoverage {
                regressor: self.name.clone(),
                date,
            }
        })?;
        Ok((value - self.mean) / self.std)
    }
}

/// Aligns the selected regressors onto the forecast date grid
#[derive(Debug)]
pub struct RegressorAssembler;

impl RegressorAssembler {
    /// Align each selected regressor over the historical and future dates
    ///
    /// Exact date match only: a selected regressor missing any required date
    /// fails the request rather than being imputed. Regressors that are
    /// constant over the historical window are rejected as uninformative.
    pub fn assemble(
        store: &SeriesStore,
        config: &ForecastConfig,
        historical_dates: &[NaiveDate],
        future_dates: &[NaiveDate],
    ) -> Result<Vec<AlignedRegressor>> {
        let mut aligned = Vec::with_capacity(config.extra_regressor_names.len());

        for name in &config.extra_regressor_names {
            let series = store
                .regressor(name)
                .ok_or_else(|| ForecastError::UnknownRegressor { name: name.clone() })?;

            let mut values = BTreeMap::new();
            let mut historical_values = Vec::with_capacity(historical_dates.len());
            for &date in historical_dates.iter().chain(future_dates.iter()) {
                let value = series.value_on(date).ok_or_else(|| {
                    ForecastError::InsufficientRegressorCoverage {
                        regressor: name.clone(),
                        date,
                    }
                })?;
                values.insert(date, value);
                if historical_values.len() < historical_dates.len() {
                    historical_values.push(value);
                }
            }

            let mean = math::mean(&historical_values);
            let std = math::std_dev(&historical_values);
            if std <= 0.0 {
                return Err(ForecastError::DegenerateRegressor { name: name.clone() });
            }

            aligned.push(AlignedRegressor {
                name: name.clone(),
                values,
                mean,
                std,
            });
        }

        Ok(aligned)
    }
}
