use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use demand_forecast::cache::ForecastCache;
use demand_forecast::contract::ForecastRequest;
use demand_forecast::crossval::CrossValidator;
use demand_forecast::data::SeriesStore;
use demand_forecast::models::least_squares::LeastSquaresDecomposition;
use demand_forecast::pipeline::FitBudget;
use demand_forecast::synthetic;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Demand Forecast: Cross-Validation and Caching Example");
    println!("=====================================================\n");

    // Five years of history gives plenty of rolling-origin folds
    println!("Creating sample data...");
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let history = synthetic::seasonal_series(start, 60, 180.0, 1.2, 15.0, 6.0, 17);
    let store = Arc::new(SeriesStore::new(history, Vec::new())?);
    println!("Sample data created: {} monthly points\n", store.len());

    // Standalone cross-validation of the decomposition model
    println!("Running rolling-origin cross-validation...");
    let config =
        demand_forecast::config::ForecastConfig::from_request(&ForecastRequest::default(), &store)?;
    let validator = CrossValidator::new();
    let model = LeastSquaresDecomposition::new();
    let metrics = validator.run(&model, store.history(), &[], &config, &FitBudget::unlimited())?;

    match metrics {
        Some(metrics) => {
            println!("Pooled hold-out metrics:");
            println!("  mape: {:.4}", metrics.mape);
            println!("  mae:  {:.4}", metrics.mae);
            println!("  rmse: {:.4}", metrics.rmse);
            if let Some(coverage) = metrics.coverage {
                println!("  coverage: {:.4}", coverage);
            }
        }
        None => println!("History too short for any validation fold"),
    }

    // The cache computes a configuration once per data snapshot
    println!("\nServing repeated requests through the forecast cache...");
    let cache = ForecastCache::new();
    let request = ForecastRequest {
        horizon_periods: Some(6),
        ..ForecastRequest::default()
    };

    let started = Instant::now();
    let first = cache.get_or_compute(&store, &request, &FitBudget::unlimited())?;
    let cold = started.elapsed();

    let started = Instant::now();
    let second = cache.get_or_compute(&store, &request, &FitBudget::unlimited())?;
    let warm = started.elapsed();

    println!("  cold request: {:?}", cold);
    println!("  warm request: {:?} (shared: {})", warm, Arc::ptr_eq(&first, &second));

    // A changed snapshot invalidates every cached entry
    let mut extended = store.history().to_vec();
    if let Some(last) = extended.last().copied() {
        if let Some(next) = synthetic::month_grid(last.date, 2).last().copied() {
            extended.push(demand_forecast::data::TimeSeriesPoint::new(next, last.value + 3.0));
        }
    }
    let refreshed = Arc::new(SeriesStore::new(extended, Vec::new())?);

    let third = cache.get_or_compute(&refreshed, &request, &FitBudget::unlimited())?;
    println!(
        "  after new month: recomputed = {}",
        !Arc::ptr_eq(&first, &third)
    );

    println!("\nValidation complete!");
    Ok(())
}
