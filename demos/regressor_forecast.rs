use chrono::NaiveDate;
use demand_forecast::contract::ForecastRequest;
use demand_forecast::data::SeriesStore;
use demand_forecast::pipeline::{run_forecast, FitBudget};
use demand_forecast::synthetic;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Demand Forecast: Extra Regressor Example");
    println!("========================================\n");

    // Demand driven by a growing service population
    println!("Creating sample data...");
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let horizon = 12;

    let history = synthetic::seasonal_series(start, 48, 220.0, 1.5, 18.0, 5.0, 21);
    let history_dates: Vec<NaiveDate> = history.iter().map(|p| p.date).collect();

    // The regressor must cover the forecast horizon as well
    let covered = synthetic::month_grid(start, history.len() + horizon);
    let population = synthetic::population_regressor("total_population", &covered, 52_000.0, 85.0, 3);

    let store = SeriesStore::new(history, vec![population])?;
    println!(
        "Sample data created: {} monthly points, regressors: {:?}\n",
        history_dates.len(),
        store.regressor_names()
    );

    // Multiplicative composition with the population covariate
    println!("Fitting multiplicative model with total_population...");
    let request = ForecastRequest {
        extra_vars: vec!["total_population".to_string()],
        seasonality_mode: "multiplicative".to_string(),
        horizon_periods: Some(horizon),
        ..ForecastRequest::default()
    };
    let result = run_forecast(&store, &request, &FitBudget::unlimited())?;
    println!("Model fit complete\n");

    println!("Forecast:");
    for point in result.forecast_data() {
        println!(
            "  {}: {:8.2}  [{:8.2}, {:8.2}]",
            point.date, point.predicted, point.lower, point.upper
        );
    }

    // Per-regressor contribution on the forecast dates
    let components = result.components();
    if let Some(contribution) = components.regressors.get("total_population") {
        let n = result.historical_actual().len();
        println!("\nPopulation contribution over the forecast horizon:");
        for point in contribution.iter().skip(n) {
            println!("  {}: {:8.2}", point.date, point.value);
        }
    }

    // The components sum back to the prediction
    let grid_len = components.len();
    let last = grid_len - 1;
    let reconstructed = components.total_at(last);
    let predicted = result.forecast_data().last().map(|p| p.predicted).unwrap_or(f64::NAN);
    println!("\nReconstruction check on the last month:");
    println!("  component sum: {:.4}", reconstructed);
    println!("  prediction:    {:.4}", predicted);

    // What happens when the regressor stops short of the horizon
    println!("\nRefitting with a truncated regressor...");
    let short_history = synthetic::seasonal_series(start, 48, 220.0, 1.5, 18.0, 5.0, 21);
    let short_cover = synthetic::month_grid(start, 50);
    let short_population =
        synthetic::population_regressor("total_population", &short_cover, 52_000.0, 85.0, 3);
    let short_store = SeriesStore::new(short_history, vec![short_population])?;

    match run_forecast(&short_store, &request, &FitBudget::unlimited()) {
        Ok(_) => println!("Unexpected success"),
        Err(err) => println!("Rejected as expected: {}", err),
    }

    println!("\nForecasting complete!");
    Ok(())
}
