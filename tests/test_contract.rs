use chrono::NaiveDate;
use demand_forecast::contract::{ApiResponse, ForecastRequest};
use demand_forecast::data::SeriesStore;
use demand_forecast::pipeline::{run_forecast, FitBudget};
use demand_forecast::synthetic;
use demand_forecast::ForecastError;
use serde_json::Value;

fn month_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

fn forecast_json(request: &ForecastRequest, months: usize) -> Value {
    let history = synthetic::seasonal_series(month_start(), months, 160.0, 1.5, 10.0, 3.0, 9);
    let covered = synthetic::month_grid(month_start(), months + 24);
    let population = synthetic::population_regressor("total_population", &covered, 47_000.0, 55.0, 4);
    let store = SeriesStore::new(history, vec![population]).unwrap();

    let result = run_forecast(&store, request, &FitBudget::unlimited()).unwrap();
    serde_json::to_value(ApiResponse::success(&result)).unwrap()
}

#[test]
fn test_success_envelope_shape() {
    let request = ForecastRequest {
        horizon_periods: Some(6),
        ..ForecastRequest::default()
    };
    let json = forecast_json(&request, 24);

    assert_eq!(json["status"], "success");
    let data = &json["data"];

    let historical = data["historical_actual"].as_array().unwrap();
    assert_eq!(historical.len(), 24);
    let first = historical[0].as_object().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first["date"], "2021-01-01");
    assert!(first["actual"].is_f64());

    let forecast = data["forecast_data"].as_array().unwrap();
    assert_eq!(forecast.len(), 30);
    let point = forecast[0].as_object().unwrap();
    assert_eq!(point.len(), 4);
    for key in ["date", "predicted", "lower", "upper"] {
        assert!(point.contains_key(key), "missing key {}", key);
    }

    let components = data["components"].as_object().unwrap();
    assert!(components.contains_key("trend"));
    assert!(components.contains_key("yearly"));
    assert_eq!(
        components["trend"].as_array().unwrap().len(),
        30
    );
}

#[test]
fn test_disabled_yearly_and_unused_regressors_are_omitted() {
    let request = ForecastRequest {
        yearly_seasonality: false,
        horizon_periods: Some(3),
        ..ForecastRequest::default()
    };
    let json = forecast_json(&request, 24);

    let components = json["data"]["components"].as_object().unwrap();
    assert!(!components.contains_key("yearly"));
    assert!(!components.contains_key("extra_regressors"));
}

#[test]
fn test_selected_regressors_appear_by_name() {
    let request = ForecastRequest {
        extra_vars: vec!["total_population".to_string()],
        horizon_periods: Some(3),
        ..ForecastRequest::default()
    };
    let json = forecast_json(&request, 24);

    let regressors = json["data"]["components"]["extra_regressors"]
        .as_object()
        .unwrap();
    assert!(regressors.contains_key("total_population"));
    assert_eq!(
        regressors["total_population"].as_array().unwrap().len(),
        27
    );
}

#[test]
fn test_cv_metrics_key_is_absent_for_short_histories() {
    let request = ForecastRequest {
        horizon_periods: Some(3),
        ..ForecastRequest::default()
    };
    let json = forecast_json(&request, 12);

    let data = json["data"].as_object().unwrap();
    assert!(!data.contains_key("cv_metrics"));

    let json = forecast_json(&request, 24);
    let data = json["data"].as_object().unwrap();
    let metrics = data["cv_metrics"].as_object().unwrap();
    for key in ["mape", "mae", "rmse", "coverage"] {
        assert!(metrics.contains_key(key), "missing key {}", key);
    }
}

#[test]
fn test_error_envelope_carries_the_message() {
    let error = ForecastError::ValidationError {
        field: "interval_width".to_string(),
        message: "must be strictly between 0 and 1, got 1.5".to_string(),
    };
    let json = serde_json::to_value(ApiResponse::error(&error)).unwrap();

    assert_eq!(json["status"], "error");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("interval_width"));
    assert!(json.get("data").is_none());
}

#[test]
fn test_from_result_picks_the_right_envelope() {
    let ok_json = {
        let history = synthetic::linear_series(month_start(), 24, 100.0, 1.0, 0.0, 3);
        let store = SeriesStore::new(history, Vec::new()).unwrap();
        let outcome = run_forecast(&store, &ForecastRequest::default(), &FitBudget::unlimited());
        serde_json::to_value(ApiResponse::from_result(&outcome)).unwrap()
    };
    assert_eq!(ok_json["status"], "success");

    let err_outcome: demand_forecast::Result<demand_forecast::ForecastResult> =
        Err(ForecastError::InsufficientData("too short".to_string()));
    let err_json = serde_json::to_value(ApiResponse::from_result(&err_outcome)).unwrap();
    assert_eq!(err_json["status"], "error");
    assert!(err_json["message"].as_str().unwrap().contains("too short"));
}

#[test]
fn test_request_deserializes_the_caller_payload() {
    let payload = r#"{
        "extra_vars": ["total_population"],
        "growth": "linear",
        "yearly_seasonality": true,
        "seasonality_mode": "additive",
        "changepoint_prior_scale": 0.05,
        "seasonality_prior_scale": 10.0,
        "interval_width": 0.8,
        "regressor_prior_scale": 10.0
    }"#;

    let request: ForecastRequest = serde_json::from_str(payload).unwrap();
    assert_eq!(request.extra_vars, vec!["total_population".to_string()]);
    assert_eq!(request.growth, "linear");
    assert_eq!(request.horizon_periods, None);
}

#[test]
fn test_request_defaults_optional_fields() {
    let payload = r#"{
        "growth": "logistic",
        "yearly_seasonality": false,
        "seasonality_mode": "multiplicative",
        "changepoint_prior_scale": 0.1,
        "seasonality_prior_scale": 5.0,
        "interval_width": 0.9,
        "regressor_prior_scale": 2.0,
        "horizon_periods": 24
    }"#;

    let request: ForecastRequest = serde_json::from_str(payload).unwrap();
    assert!(request.extra_vars.is_empty());
    assert_eq!(request.horizon_periods, Some(24));

    let round_trip: ForecastRequest =
        serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
    assert_eq!(round_trip.growth, request.growth);
    assert_eq!(round_trip.horizon_periods, request.horizon_periods);
}
