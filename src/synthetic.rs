//! Seeded synthetic series for demos and tests

use crate::data::{RegressorSeries, TimeSeriesPoint};
use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Month-start date grid of length `n`
pub fn month_grid(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    for step in 0..n {
        match start.checked_add_months(Months::new(step as u32)) {
            Some(date) => dates.push(date),
            None => break,
        }
    }
    dates
}

/// Monthly demand series following a linear trend with Gaussian noise
pub fn linear_series(
    start: NaiveDate,
    n: usize,
    base: f64,
    slope: f64,
    noise: f64,
    seed: u64,
) -> Vec<TimeSeriesPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, noise.max(0.0)).ok();

    month_grid(start, n)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let wiggle = normal.map(|d| d.sample(&mut rng)).unwrap_or(0.0);
            TimeSeriesPoint::new(date, base + slope * i as f64 + wiggle)
        })
        .collect()
}

/// Linear trend plus a yearly sinusoid peaking mid-year
pub fn seasonal_series(
    start: NaiveDate,
    n: usize,
    base: f64,
    slope: f64,
    amplitude: f64,
    noise: f64,
    seed: u64,
) -> Vec<TimeSeriesPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, noise.max(0.0)).ok();

    month_grid(start, n)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let phase = 2.0 * PI * f64::from(date.month0()) / 12.0;
            let wiggle = normal.map(|d| d.sample(&mut rng)).unwrap_or(0.0);
            let value = base + slope * i as f64 + amplitude * phase.sin() + wiggle;
            TimeSeriesPoint::new(date, value)
        })
        .collect()
}

/// Slowly growing population covariate aligned to a date grid
pub fn population_regressor(
    name: &str,
    dates: &[NaiveDate],
    base: f64,
    monthly_growth: f64,
    seed: u64,
) -> RegressorSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, base.abs() * 0.001).ok();

    let points = dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let wiggle = normal.map(|d| d.sample(&mut rng)).unwrap_or(0.0);
            TimeSeriesPoint::new(date, base + monthly_growth * i as f64 + wiggle)
        })
        .collect();
    RegressorSeries::new(name, points)
}
