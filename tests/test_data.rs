use chrono::NaiveDate;
use demand_forecast::data::{
    future_month_dates, DataLoader, RegressorSeries, SeriesStore, TimeSeriesPoint,
};
use demand_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_data_loader_from_csv() {
    // Create a temporary CSV file
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "month_date,demand,total_population,rainfall_mm").unwrap();
    writeln!(file, "2023-01-01,210.0,51000,32.5").unwrap();
    writeln!(file, "2023-02-01,214.0,51080,28.0").unwrap();
    writeln!(file, "2023-03-01,219.0,51161,41.0").unwrap();

    let path = file.path().to_str().unwrap();
    let store = DataLoader::from_csv(path).unwrap();

    assert_eq!(store.len(), 3);
    assert!(!store.is_empty());
    assert_eq!(store.first_date(), Some(date(2023, 1, 1)));
    assert_eq!(store.last_date(), Some(date(2023, 3, 1)));

    let mut names = store.regressor_names();
    names.sort_unstable();
    assert_eq!(names, vec!["rainfall_mm", "total_population"]);
    assert_eq!(
        store.regressor("total_population").unwrap().value_on(date(2023, 2, 1)),
        Some(51_080.0)
    );
}

#[test]
fn test_empty_demand_cells_become_future_regressor_rows() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,demand,total_population").unwrap();
    writeln!(file, "2023-01-01,210.0,51000").unwrap();
    writeln!(file, "2023-02-01,214.0,51080").unwrap();
    writeln!(file, "2023-03-01,,51161").unwrap();

    let store = DataLoader::from_csv(file.path().to_str().unwrap()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.last_date(), Some(date(2023, 2, 1)));
    assert_eq!(
        store.regressor("total_population").unwrap().points().len(),
        3
    );
}

#[test]
fn test_data_loader_error_handling() {
    // Non-existent file
    let result = DataLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));

    // No date column
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "demand,total_population").unwrap();
    writeln!(file, "210.0,51000").unwrap();
    let result = DataLoader::from_csv(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ForecastError::DataError(_))));

    // No demand column
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,total_population").unwrap();
    writeln!(file, "2023-01-01,51000").unwrap();
    let result = DataLoader::from_csv(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ForecastError::DataError(_))));

    // Unparseable date
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,demand").unwrap();
    writeln!(file, "01/15/2023,210.0").unwrap();
    let result = DataLoader::from_csv(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_store_rejects_unordered_dates() {
    let history = vec![
        TimeSeriesPoint::new(date(2023, 2, 1), 100.0),
        TimeSeriesPoint::new(date(2023, 1, 1), 101.0),
    ];
    let result = SeriesStore::new(history, Vec::new());
    assert!(matches!(result, Err(ForecastError::DataError(_))));

    let history = vec![
        TimeSeriesPoint::new(date(2023, 1, 1), 100.0),
        TimeSeriesPoint::new(date(2023, 1, 1), 101.0),
    ];
    let result = SeriesStore::new(history, Vec::new());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_store_rejects_non_finite_values() {
    let history = vec![
        TimeSeriesPoint::new(date(2023, 1, 1), 100.0),
        TimeSeriesPoint::new(date(2023, 2, 1), f64::NAN),
    ];
    assert!(matches!(
        SeriesStore::new(history, Vec::new()),
        Err(ForecastError::DataError(_))
    ));

    let history = vec![TimeSeriesPoint::new(date(2023, 1, 1), 100.0)];
    let regressor = RegressorSeries::new(
        "total_population",
        vec![TimeSeriesPoint::new(date(2023, 1, 1), f64::INFINITY)],
    );
    assert!(matches!(
        SeriesStore::new(history, vec![regressor]),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_store_rejects_duplicate_regressor_names() {
    let history = vec![TimeSeriesPoint::new(date(2023, 1, 1), 100.0)];
    let points = vec![TimeSeriesPoint::new(date(2023, 1, 1), 51_000.0)];
    let result = SeriesStore::new(
        history,
        vec![
            RegressorSeries::new("total_population", points.clone()),
            RegressorSeries::new("total_population", points),
        ],
    );
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_snapshot_id_tracks_content() {
    let history = vec![
        TimeSeriesPoint::new(date(2023, 1, 1), 100.0),
        TimeSeriesPoint::new(date(2023, 2, 1), 102.0),
    ];
    let a = SeriesStore::new(history.clone(), Vec::new()).unwrap();
    let b = SeriesStore::new(history.clone(), Vec::new()).unwrap();
    assert_eq!(a.snapshot_id(), b.snapshot_id());

    let mut changed = history;
    changed[1].value = 103.0;
    let c = SeriesStore::new(changed, Vec::new()).unwrap();
    assert_ne!(a.snapshot_id(), c.snapshot_id());
}

#[test]
fn test_future_month_dates_step_whole_months() {
    let dates = future_month_dates(date(2023, 10, 1), 4).unwrap();
    assert_eq!(
        dates,
        vec![
            date(2023, 11, 1),
            date(2023, 12, 1),
            date(2024, 1, 1),
            date(2024, 2, 1),
        ]
    );

    // Month-end anchors clamp to the shorter month
    let dates = future_month_dates(date(2023, 1, 31), 2).unwrap();
    assert_eq!(dates, vec![date(2023, 2, 28), date(2023, 3, 31)]);

    assert!(future_month_dates(date(2023, 1, 1), 0).unwrap().is_empty());
}
