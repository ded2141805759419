//! Historical series and regressor tables for demand forecasting

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};
use polars::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A single dated observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Observed value
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Create a new observation
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named exogenous series that can be selected as a model regressor
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorSeries {
    name: String,
    points: Vec<TimeSeriesPoint>,
}

impl RegressorSeries {
    /// Create a new regressor series
    pub fn new(name: impl Into<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Name of the regressor
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dated observations of this regressor
    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    /// Look up the value on an exact date
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

/// Immutable snapshot of the cleaned historical series and candidate regressors
///
/// Produced by the ingestion layer and read-only for the duration of a
/// forecast request. The snapshot id is a content hash, so two stores built
/// from identical data share the same id.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    history: Vec<TimeSeriesPoint>,
    regressors: Vec<RegressorSeries>,
    snapshot: u64,
}

impl SeriesStore {
    /// Create a new store, validating date order and value finiteness
    pub fn new(history: Vec<TimeSeriesPoint>, regressors: Vec<RegressorSeries>) -> Result<Self> {
        validate_points(&history, "history")?;
        for regressor in &regressors {
            validate_points(regressor.points(), regressor.name())?;
        }
        for (i, regressor) in regressors.iter().enumerate() {
            if regressors[..i].iter().any(|r| r.name() == regressor.name()) {
                return Err(ForecastError::DataError(format!(
                    "Duplicate regressor series '{}'",
                    regressor.name()
                )));
            }
        }

        let snapshot = content_hash(&history, &regressors);
        Ok(Self {
            history,
            regressors,
            snapshot,
        })
    }

    /// The historical demand series
    pub fn history(&self) -> &[TimeSeriesPoint] {
        &self.history
    }

    /// Dates of the historical series, in ascending order
    pub fn history_dates(&self) -> Vec<NaiveDate> {
        self.history.iter().map(|p| p.date).collect()
    }

    /// All candidate regressor series
    pub fn regressors(&self) -> &[RegressorSeries] {
        &self.regressors
    }

    /// Look up a regressor by name
    pub fn regressor(&self, name: &str) -> Option<&RegressorSeries> {
        self.regressors.iter().find(|r| r.name() == name)
    }

    /// Names of all known regressors
    pub fn regressor_names(&self) -> Vec<&str> {
        self.regressors.iter().map(|r| r.name()).collect()
    }

    /// Content-derived snapshot identity
    pub fn snapshot_id(&self) -> u64 {
        self.snapshot
    }

    /// First historical date, if any
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.history.first().map(|p| p.date)
    }

    /// Last historical date, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.history.last().map(|p| p.date)
    }

    /// Number of historical observations
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Check whether the historical series is empty
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Generate the future date grid by stepping whole calendar months past `last`
pub fn future_month_dates(last: NaiveDate, horizon_periods: usize) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(horizon_periods);
    for step in 1..=horizon_periods {
        let date = last
            .checked_add_months(Months::new(step as u32))
            .ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Date overflow stepping {} months past {}",
                    step, last
                ))
            })?;
        dates.push(date);
    }
    Ok(dates)
}

fn validate_points(points: &[TimeSeriesPoint], series: &str) -> Result<()> {
    for pair in points.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ForecastError::DataError(format!(
                "Series '{}' has non-ascending dates: {} followed by {}",
                series, pair[0].date, pair[1].date
            )));
        }
    }
    for point in points {
        if !point.value.is_finite() {
            return Err(ForecastError::DataError(format!(
                "Series '{}' has a non-finite value on {}",
                series, point.date
            )));
        }
    }
    Ok(())
}

fn content_hash(history: &[TimeSeriesPoint], regressors: &[RegressorSeries]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for point in history {
        point.date.num_days_from_ce().hash(&mut hasher);
        point.value.to_bits().hash(&mut hasher);
    }
    for regressor in regressors {
        regressor.name().hash(&mut hasher);
        for point in regressor.points() {
            point.date.num_days_from_ce().hash(&mut hasher);
            point.value.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Data loader for demand history and regressor tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series store from a CSV file
    ///
    /// Expects one date column (name containing "date" or "month"), one
    /// target column (name containing "demand", "value" or "count") and
    /// zero or more numeric regressor columns. An empty cell means the
    /// series has no value for that date, so rows with an empty demand
    /// cell carry projected regressor values past the observed history.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SeriesStore> {
        let file = File::open(path)?;
        // Use polars DataFrame reader directly
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build a series store from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<SeriesStore> {
        let date_column = Self::detect_date_column(&df)?;
        let target_column = Self::detect_target_column(&df, &date_column)?;

        let dates = Self::column_as_dates(&df, &date_column)?;
        let target_cells = Self::series_as_opt_f64(df.column(&target_column)?).ok_or_else(|| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                target_column
            ))
        })??;

        let history: Vec<TimeSeriesPoint> = dates
            .iter()
            .zip(target_cells.iter())
            .filter_map(|(&date, cell)| cell.map(|value| TimeSeriesPoint::new(date, value)))
            .collect();

        let mut regressors = Vec::new();
        for name in df.get_column_names() {
            if name == date_column || name == target_column {
                continue;
            }
            let col = df.column(name)?;
            let Some(cells) = Self::series_as_opt_f64(col) else {
                continue;
            };
            let cells = cells?;
            let points: Vec<TimeSeriesPoint> = dates
                .iter()
                .zip(cells.iter())
                .filter_map(|(&date, cell)| cell.map(|value| TimeSeriesPoint::new(date, value)))
                .collect();
            regressors.push(RegressorSeries::new(name, points));
        }

        SeriesStore::new(history, regressors)
    }

    /// Detect the date column in a DataFrame
    fn detect_date_column(df: &DataFrame) -> Result<String> {
        for name in df.get_column_names() {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date") || lower_name.contains("month") {
                return Ok(name.to_string());
            }
        }

        // If not found, use the first column if it looks like a date
        if let Some(first_col) = df.get_columns().first() {
            if first_col.dtype().is_temporal() {
                return Ok(first_col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No date column found in data".to_string(),
        ))
    }

    /// Detect the demand/target column in a DataFrame
    fn detect_target_column(df: &DataFrame, date_column: &str) -> Result<String> {
        for name in df.get_column_names() {
            if name == date_column {
                continue;
            }
            let lower_name = name.to_lowercase();
            if lower_name.contains("demand")
                || lower_name.contains("value")
                || lower_name.contains("count")
            {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No demand column found in data".to_string(),
        ))
    }

    /// Read a column as dates, accepting ISO strings or a native date dtype
    fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<NaiveDate>> {
        let col = df.column(column_name)?;
        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|cell| {
                    let text = cell.ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "Column '{}' has an empty date cell",
                            column_name
                        ))
                    })?;
                    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                        ForecastError::DataError(format!(
                            "Column '{}' has an unparseable date '{}'",
                            column_name, text
                        ))
                    })
                })
                .collect(),
            DataType::Date => col
                .date()?
                .into_iter()
                .map(|cell| {
                    let days = cell.ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "Column '{}' has an empty date cell",
                            column_name
                        ))
                    })?;
                    // polars dates are days since the unix epoch
                    NaiveDate::from_num_days_from_ce_opt(days + 719_163).ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "Column '{}' has an out-of-range date",
                            column_name
                        ))
                    })
                })
                .collect(),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has dtype {} and cannot be read as dates",
                column_name, other
            ))),
        }
    }

    /// Read a numeric column cell-wise, or None if the dtype is not numeric
    fn series_as_opt_f64(col: &Series) -> Option<Result<Vec<Option<f64>>>> {
        let cells = match col.dtype() {
            DataType::Float64 => col.f64().map(|c| c.into_iter().collect()),
            DataType::Float32 => col
                .f32()
                .map(|c| c.into_iter().map(|v| v.map(|v| v as f64)).collect()),
            DataType::Int64 => col
                .i64()
                .map(|c| c.into_iter().map(|v| v.map(|v| v as f64)).collect()),
            DataType::Int32 => col
                .i32()
                .map(|c| c.into_iter().map(|v| v.map(|v| v as f64)).collect()),
            DataType::UInt64 => col
                .u64()
                .map(|c| c.into_iter().map(|v| v.map(|v| v as f64)).collect()),
            DataType::UInt32 => col
                .u32()
                .map(|c| c.into_iter().map(|v| v.map(|v| v as f64)).collect()),
            _ => return None,
        };
        Some(cells.map_err(ForecastError::from))
    }
}
