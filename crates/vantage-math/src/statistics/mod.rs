//! Sample statistics over return series.
//!
//! Covariance and variance use the unbiased `n − 1` denominator.

use crate::error::{MathError, MathResult};
use crate::linear_algebra::DenseMatrix;

/// Arithmetic mean. Returns 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance.
pub fn variance(values: &[f64]) -> MathResult<f64> {
    if values.len() < 2 {
        return Err(MathError::insufficient_data(2, values.len()));
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

/// Unbiased sample standard deviation.
pub fn std_dev(values: &[f64]) -> MathResult<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample covariance matrix of equally long columns.
///
/// Returns the mean vector and the n×n covariance matrix, where n is the
/// number of columns.
pub fn sample_covariance(columns: &[&[f64]]) -> MathResult<(Vec<f64>, DenseMatrix)> {
    let n = columns.len();
    let m = columns.first().map_or(0, |c| c.len());

    if let Some(bad) = columns.iter().find(|c| c.len() != m) {
        return Err(MathError::RaggedColumns {
            expected: m,
            actual: bad.len(),
        });
    }
    if n > 0 && m < 2 {
        return Err(MathError::insufficient_data(2, m));
    }

    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
    let mut cov = DenseMatrix::zeros(n, n);
    let denom = (m.max(2) - 1) as f64;

    for i in 0..n {
        for j in 0..=i {
            let (ci, cj) = (columns[i], columns[j]);
            let (mi, mj) = (means[i], means[j]);
            let sum: f64 = ci
                .iter()
                .zip(cj)
                .map(|(a, b)| (a - mi) * (b - mj))
                .sum();
            let value = sum / denom;
            cov[(i, j)] = value;
            cov[(j, i)] = value;
        }
    }

    Ok((means, cov))
}

/// Per-asset volatility: the square root of each diagonal entry.
///
/// Negative diagonal entries (numerical noise) are clamped to zero.
pub fn volatilities(covariance: &DenseMatrix) -> Vec<f64> {
    covariance
        .diagonal()
        .into_iter()
        .map(|v| v.max(0.0).sqrt())
        .collect()
}

/// Normalized correlation matrix `Σ_ij / (σ_i σ_j)`.
///
/// The diagonal is 1.0. Off-diagonal entries involving a zero-volatility
/// asset are 0; all entries are clamped to `[-1, 1]`.
pub fn correlation_from_covariance(covariance: &DenseMatrix) -> MathResult<DenseMatrix> {
    if !covariance.is_square() {
        return Err(MathError::NotSquare {
            rows: covariance.rows(),
            cols: covariance.cols(),
        });
    }
    let n = covariance.rows();
    let sigma = volatilities(covariance);
    let mut corr = DenseMatrix::zeros(n, n);

    for i in 0..n {
        for j in 0..n {
            corr[(i, j)] = if i == j {
                1.0
            } else if sigma[i] > 0.0 && sigma[j] > 0.0 {
                (covariance[(i, j)] / (sigma[i] * sigma[j])).clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }
    }

    Ok(corr)
}

/// Log returns `ln(p_t / p_{t−1})` from a price series.
pub fn log_returns(prices: &[f64]) -> MathResult<Vec<f64>> {
    check_prices(prices)?;
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Simple returns `p_t / p_{t−1} − 1` from a price series.
pub fn simple_returns(prices: &[f64]) -> MathResult<Vec<f64>> {
    check_prices(prices)?;
    Ok(prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}

fn check_prices(prices: &[f64]) -> MathResult<()> {
    if let Some(p) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(MathError::invalid_input(format!(
            "prices must be positive and finite, got {p}"
        )));
    }
    Ok(())
}

/// Index of the empirical lower quantile in an ascending sample of size `n`.
///
/// `floor((1 − confidence) · n)` clamped to `[0, n − 1]`.
pub fn quantile_index(confidence: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let raw = ((1.0 - confidence) * n as f64).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let values = [0.02, -0.02, 0.02, -0.02];
        assert_relative_eq!(mean(&values), 0.0);
        // ss = 4 × 0.0004, / 3
        assert_relative_eq!(variance(&values).unwrap(), 0.0016 / 3.0, epsilon = 1e-15);
        assert!(variance(&[1.0]).is_err());
    }

    #[test]
    fn test_covariance_matches_variance_on_diagonal() {
        let a = [0.01, 0.03, -0.02, 0.00, 0.015];
        let b = [0.02, 0.01, -0.01, 0.005, 0.0];
        let (means, cov) = sample_covariance(&[&a, &b]).unwrap();
        assert_relative_eq!(means[0], mean(&a));
        assert_relative_eq!(cov[(0, 0)], variance(&a).unwrap(), epsilon = 1e-15);
        assert_relative_eq!(cov[(1, 1)], variance(&b).unwrap(), epsilon = 1e-15);
        assert_relative_eq!(cov[(0, 1)], cov[(1, 0)]);
    }

    #[test]
    fn test_covariance_rejects_ragged_columns() {
        let a = [0.01, 0.02, 0.03];
        let b = [0.01, 0.02];
        assert!(sample_covariance(&[&a, &b]).is_err());
        assert!(sample_covariance(&[&[0.01][..]]).is_err());
    }

    #[test]
    fn test_identical_series_fully_correlated() {
        let a = [0.01, -0.02, 0.03, 0.0, -0.01];
        let (_, cov) = sample_covariance(&[&a, &a]).unwrap();
        let corr = correlation_from_covariance(&cov).unwrap();
        assert_relative_eq!(corr[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr[(1, 1)], 1.0);
    }

    #[test]
    fn test_zero_volatility_correlation() {
        let flat = [0.01, 0.01, 0.01];
        let moving = [0.01, 0.02, 0.03];
        let (_, cov) = sample_covariance(&[&flat, &moving]).unwrap();
        let corr = correlation_from_covariance(&cov).unwrap();
        assert_eq!(corr[(0, 0)], 1.0);
        assert_eq!(corr[(0, 1)], 0.0);
        assert_eq!(volatilities(&cov)[0], 0.0);
    }

    #[test]
    fn test_returns_from_prices() {
        let prices = [100.0, 110.0, 99.0];
        let simple = simple_returns(&prices).unwrap();
        assert_relative_eq!(simple[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(simple[1], -0.1, epsilon = 1e-12);

        let log = log_returns(&prices).unwrap();
        assert_relative_eq!(log[0], 1.1_f64.ln(), epsilon = 1e-12);
        assert_eq!(log.len(), 2);

        assert!(log_returns(&[100.0, 0.0]).is_err());
        assert!(log_returns(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_quantile_index() {
        assert_eq!(quantile_index(0.95, 10_000), 500);
        assert_eq!(quantile_index(0.99, 10_000), 100);
        assert_eq!(quantile_index(0.95, 10), 0);
        assert_eq!(quantile_index(0.999_999, 10), 0);
        assert_eq!(quantile_index(0.000_001, 10), 9);
        assert_eq!(quantile_index(0.95, 0), 0);
    }
}
