//! Separable forecast components over a date range

use crate::data::TimeSeriesPoint;
use crate::error::Result;
use crate::models::FittedModel;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-date values of each separable model component
///
/// The sum `trend + yearly + regressors` reconstructs the point prediction
/// on every date, in both additive and multiplicative composition (the
/// multiplicative factors are stored as trend-scaled contributions).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSeries {
    /// Trend component
    pub trend: Vec<TimeSeriesPoint>,
    /// Yearly seasonal component, present when enabled in the configuration
    pub yearly: Option<Vec<TimeSeriesPoint>>,
    /// One contribution series per selected regressor
    pub regressors: BTreeMap<String, Vec<TimeSeriesPoint>>,
}

impl ComponentSeries {
    /// Sum of all component values at a grid index
    pub fn total_at(&self, idx: usize) -> f64 {
        let mut total = self.trend.get(idx).map(|p| p.value).unwrap_or(0.0);
        if let Some(yearly) = &self.yearly {
            total += yearly.get(idx).map(|p| p.value).unwrap_or(0.0);
        }
        for series in self.regressors.values() {
            total += series.get(idx).map(|p| p.value).unwrap_or(0.0);
        }
        total
    }

    /// Number of dates each component series covers
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    /// Check whether the component series is empty
    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }
}

/// Evaluates a fitted model's separable components over a date range
#[derive(Debug)]
pub struct ComponentDecomposer;

impl ComponentDecomposer {
    /// Extract trend, seasonal and regressor contributions per date
    pub fn decompose<M: FittedModel + ?Sized>(
        model: &M,
        dates: &[NaiveDate],
    ) -> Result<ComponentSeries> {
        model.decompose(dates)
    }
}
