use chrono::NaiveDate;
use demand_forecast::config::ForecastConfig;
use demand_forecast::contract::ForecastRequest;
use demand_forecast::crossval::CrossValidator;
use demand_forecast::data::{SeriesStore, TimeSeriesPoint};
use demand_forecast::models::least_squares::LeastSquaresDecomposition;
use demand_forecast::pipeline::{run_forecast, FitBudget};
use demand_forecast::synthetic;
use demand_forecast::ForecastError;

fn month_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

#[test]
fn test_two_years_of_linear_history_scores_well() {
    // 24 points give two folds: train 12 predict 6, train 18 predict 6
    let history = synthetic::linear_series(month_start(), 24, 130.0, 2.5, 0.0, 1);
    let store = SeriesStore::new(history, Vec::new()).unwrap();

    let request = ForecastRequest {
        yearly_seasonality: false,
        horizon_periods: Some(6),
        ..ForecastRequest::default()
    };
    let result = run_forecast(&store, &request, &FitBudget::unlimited()).unwrap();

    // The forecast extends six months past the history
    assert_eq!(result.forecast_data().len(), 30);

    let metrics = result.cv_metrics().unwrap();
    assert!(metrics.mape < 0.05, "mape {} too large", metrics.mape);
    assert!(metrics.mae >= 0.0);
    assert!(metrics.rmse >= 0.0);
    let coverage = metrics.coverage.unwrap();
    assert!((0.0..=1.0).contains(&coverage));
}

#[test]
fn test_short_history_forecasts_without_metrics() {
    // Exactly the minimum training window leaves nothing to hold out
    let history = synthetic::linear_series(month_start(), 12, 130.0, 2.5, 0.0, 1);
    let store = SeriesStore::new(history, Vec::new()).unwrap();

    let request = ForecastRequest {
        horizon_periods: Some(6),
        ..ForecastRequest::default()
    };
    let result = run_forecast(&store, &request, &FitBudget::unlimited()).unwrap();

    assert!(result.cv_metrics().is_none());
    assert_eq!(result.forecast_data().len(), 18);
}

#[test]
fn test_thirteen_points_make_a_single_partial_fold() {
    let history = synthetic::linear_series(month_start(), 13, 130.0, 2.5, 0.0, 1);
    let store = SeriesStore::new(history.clone(), Vec::new()).unwrap();
    let config = ForecastConfig::from_request(&ForecastRequest::default(), &store).unwrap();

    let metrics = CrossValidator::new()
        .run(
            &LeastSquaresDecomposition::new(),
            &history,
            &[],
            &config,
            &FitBudget::unlimited(),
        )
        .unwrap();

    assert!(metrics.is_some());
}

#[test]
fn test_all_zero_history_reports_zero_errors() {
    let history: Vec<TimeSeriesPoint> = synthetic::month_grid(month_start(), 24)
        .into_iter()
        .map(|date| TimeSeriesPoint::new(date, 0.0))
        .collect();
    let store = SeriesStore::new(history, Vec::new()).unwrap();

    let result =
        run_forecast(&store, &ForecastRequest::default(), &FitBudget::unlimited()).unwrap();
    let metrics = result.cv_metrics().unwrap();

    // Every held-out actual is zero, so it is excluded from mape
    assert_eq!(metrics.mape, 0.0);
    assert!(metrics.mae.abs() < 1e-9);
    assert!(metrics.rmse.abs() < 1e-9);
    assert_eq!(metrics.coverage, Some(1.0));
    assert!(metrics.mape.is_finite());
}

#[test]
fn test_noisy_history_coverage_stays_in_range() {
    let history = synthetic::seasonal_series(month_start(), 48, 170.0, 1.2, 12.0, 8.0, 55);
    let store = SeriesStore::new(history, Vec::new()).unwrap();

    let result =
        run_forecast(&store, &ForecastRequest::default(), &FitBudget::unlimited()).unwrap();
    let metrics = result.cv_metrics().unwrap();

    assert!(metrics.mape >= 0.0);
    assert!(metrics.rmse >= metrics.mae - 1e-12);
    let coverage = metrics.coverage.unwrap();
    assert!((0.0..=1.0).contains(&coverage));
}

#[test]
fn test_custom_windows_reject_zero() {
    assert!(matches!(
        CrossValidator::with_windows(0, 6, 6),
        Err(ForecastError::ValidationError { .. })
    ));
    assert!(matches!(
        CrossValidator::with_windows(12, 0, 6),
        Err(ForecastError::ValidationError { .. })
    ));
    assert!(matches!(
        CrossValidator::with_windows(12, 6, 0),
        Err(ForecastError::ValidationError { .. })
    ));
    assert!(CrossValidator::with_windows(8, 4, 4).is_ok());
}

#[test]
fn test_custom_windows_run_end_to_end() {
    let history = synthetic::linear_series(month_start(), 20, 90.0, 1.0, 0.0, 2);
    let store = SeriesStore::new(history.clone(), Vec::new()).unwrap();
    let config = ForecastConfig::from_request(&ForecastRequest::default(), &store).unwrap();

    let validator = CrossValidator::with_windows(8, 4, 4).unwrap();
    let metrics = validator
        .run(
            &LeastSquaresDecomposition::new(),
            &history,
            &[],
            &config,
            &FitBudget::unlimited(),
        )
        .unwrap()
        .unwrap();

    assert!(metrics.mape < 0.1);
    assert!(metrics.coverage.is_some());
}

#[test]
fn test_cancelled_budget_stops_validation() {
    let history = synthetic::linear_series(month_start(), 24, 130.0, 2.5, 0.0, 1);
    let store = SeriesStore::new(history.clone(), Vec::new()).unwrap();
    let config = ForecastConfig::from_request(&ForecastRequest::default(), &store).unwrap();

    let budget = FitBudget::unlimited();
    budget.cancel();

    let error = CrossValidator::new()
        .run(
            &LeastSquaresDecomposition::new(),
            &history,
            &[],
            &config,
            &budget,
        )
        .unwrap_err();
    assert!(matches!(error, ForecastError::FitTimeout));
}
