use chrono::NaiveDate;
use demand_forecast::contract::{ApiResponse, ForecastRequest};
use demand_forecast::data::SeriesStore;
use demand_forecast::pipeline::{run_forecast, FitBudget};
use demand_forecast::synthetic;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Demand Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    // Create sample data
    println!("Creating sample data...");
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let history = synthetic::seasonal_series(start, 36, 140.0, 2.0, 12.0, 4.0, 11);
    let store = SeriesStore::new(history, Vec::new())?;

    println!(
        "Sample data created: {} monthly points ({} to {})\n",
        store.len(),
        store.first_date().unwrap(),
        store.last_date().unwrap()
    );

    // Fit the model and forecast a year ahead
    println!("Fitting decomposition model...");
    let request = ForecastRequest {
        horizon_periods: Some(12),
        ..ForecastRequest::default()
    };
    let result = run_forecast(&store, &request, &FitBudget::unlimited())?;
    println!("Model fit complete\n");

    println!("Forecast with {}% intervals:", 100.0 * request.interval_width);
    for point in result.forecast_data() {
        println!(
            "  {}: {:8.2}  [{:8.2}, {:8.2}]",
            point.date, point.predicted, point.lower, point.upper
        );
    }

    // Component breakdown for the first forecast month
    let components = result.components();
    println!("\nComponent breakdown (first forecast month):");
    println!("  trend:  {:8.2}", components.trend[0].value);
    if let Some(yearly) = &components.yearly {
        println!("  yearly: {:8.2}", yearly[0].value);
    }

    // Cross-validation accuracy over the history
    if let Some(metrics) = result.cv_metrics() {
        println!("\nCross-validation metrics:");
        println!("  mape: {:.4}", metrics.mape);
        println!("  mae:  {:.4}", metrics.mae);
        println!("  rmse: {:.4}", metrics.rmse);
        if let Some(coverage) = metrics.coverage {
            println!("  coverage: {:.4}", coverage);
        }
    }

    // The same result as the JSON payload served over HTTP
    println!("\nJSON response envelope (truncated):");
    let response = ApiResponse::success(&result);
    let payload = serde_json::to_string_pretty(&response)?;
    for line in payload.lines().take(20) {
        println!("{}", line);
    }
    println!("  ...");

    println!("\nForecasting complete!");
    Ok(())
}
