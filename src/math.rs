//! Numerical routines shared by the decomposition model

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Diagonal jitter keeping the normal equations positive definite
const RIDGE_JITTER: f64 = 1e-9;

/// Solve a ridge-penalized least squares problem via the normal equations
///
/// `rows` is the design matrix in row-major order, `penalties` holds one
/// ridge strength per column (zero leaves a column unpenalized).
pub fn ridge_solve(rows: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if rows.len() != targets.len() {
        return Err(ForecastError::MathError(format!(
            "Design matrix has {} rows for {} targets",
            rows.len(),
            targets.len()
        )));
    }
    let cols = penalties.len();
    if rows.iter().any(|row| row.len() != cols) {
        return Err(ForecastError::MathError(
            "Design matrix rows have inconsistent widths".to_string(),
        ));
    }
    if rows.is_empty() {
        return Err(ForecastError::MathError(
            "Cannot solve an empty system".to_string(),
        ));
    }

    // Accumulate X'X and X'y
    let mut gram = vec![vec![0.0; cols]; cols];
    let mut moment = vec![0.0; cols];
    for (row, &target) in rows.iter().zip(targets.iter()) {
        for i in 0..cols {
            moment[i] += row[i] * target;
            for j in i..cols {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..cols {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    let jitter_scale = (0..cols).fold(1.0_f64, |acc, i| acc.max(gram[i][i]));
    for i in 0..cols {
        gram[i][i] += penalties[i] + RIDGE_JITTER * jitter_scale;
    }

    cholesky_solve(gram, moment)
}

/// Solve `a * x = b` for a symmetric positive definite matrix
fn cholesky_solve(mut a: Vec<Vec<f64>>, b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    // In-place lower-triangular factorization
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= a[i][k] * a[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(ForecastError::MathError(
                        "Normal equations are not positive definite".to_string(),
                    ));
                }
                a[i][j] = sum.sqrt();
            } else {
                a[i][j] = sum / a[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut x = b;
    for i in 0..n {
        for k in 0..i {
            x[i] -= a[i][k] * x[k];
        }
        x[i] /= a[i][i];
    }

    // Back substitution: L' x = y
    for i in (0..n).rev() {
        for k in (i + 1)..n {
            x[i] -= a[k][i] * x[k];
        }
        x[i] /= a[i][i];
    }

    Ok(x)
}

/// Yearly Fourier features for a day-valued covariate
///
/// Returns interleaved sin/cos pairs for harmonics 1..=order.
pub fn fourier_features(day: f64, order: usize, period: f64) -> Vec<f64> {
    let mut features = Vec::with_capacity(2 * order);
    for harmonic in 1..=order {
        let angle = 2.0 * PI * harmonic as f64 * day / period;
        features.push(angle.sin());
        features.push(angle.cos());
    }
    features
}

/// Logistic sigmoid
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Inverse of the logistic sigmoid; the caller clamps `p` into (0, 1)
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|v| (v - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Root mean square of a sample
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean_square = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    mean_square.sqrt()
}

/// Two-sided standard normal quantile for a central interval width
pub fn normal_z(interval_width: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::MathError(format!("Normal distribution: {}", e)))?;
    Ok(normal.inverse_cdf((1.0 + interval_width) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_ridge_solve_recovers_exact_line() {
        // y = 3 + 2x fit with unpenalized intercept and slope
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();
        let coef = ridge_solve(&rows, &targets, &[0.0, 0.0]).unwrap();

        assert_approx_eq!(coef[0], 3.0, 1e-6);
        assert_approx_eq!(coef[1], 2.0, 1e-6);
    }

    #[test]
    fn test_ridge_penalty_shrinks_coefficients() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();

        let free = ridge_solve(&rows, &targets, &[0.0]).unwrap();
        let heavy = ridge_solve(&rows, &targets, &[1000.0]).unwrap();

        assert!(heavy[0].abs() < free[0].abs());
        assert_approx_eq!(free[0], 2.0, 1e-6);
    }

    #[test]
    fn test_ridge_solve_rejects_shape_mismatch() {
        let rows = vec![vec![1.0, 2.0]];
        let result = ridge_solve(&rows, &[1.0, 2.0], &[0.0, 0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fourier_features_repeat_yearly() {
        let a = fourier_features(10.0, 3, 365.25);
        let b = fourier_features(10.0 + 365.25, 3, 365.25);

        assert_eq!(a.len(), 6);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_approx_eq!(x, y, 1e-9);
        }
    }

    #[test]
    fn test_sigmoid_logit_roundtrip() {
        for &p in &[0.01, 0.25, 0.5, 0.75, 0.99] {
            assert_approx_eq!(sigmoid(logit(p)), p, 1e-12);
        }
    }

    #[test]
    fn test_normal_z_matches_reference_quantiles() {
        assert_approx_eq!(normal_z(0.95).unwrap(), 1.959964, 1e-5);
        assert_approx_eq!(normal_z(0.8).unwrap(), 1.281552, 1e-5);
    }

    #[test]
    fn test_std_dev_population() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx_eq!(std_dev(&values), 2.0, 1e-12);
    }
}
