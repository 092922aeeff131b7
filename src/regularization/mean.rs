use super::check_non_negative;
use super::variance::{column_variance, ensure_positive};
use crate::error::{DiscrimError, Result};
use crate::{Matrix, Vector};
use ndarray::Axis;
use tracing::debug;

/// A class mean shrunk toward the grand mean of its own components.
#[derive(Clone, Debug)]
pub struct ShrunkenMean {
    pub mean: Vector,
    /// Shrinkage coefficient `r` that was applied.
    pub coefficient: f64,
    /// Resulting weight on the raw deviation, in `[0, 1]`.
    pub factor: f64,
}

/// Closed-form coefficient of the Lindley-type estimator (Tong, Chen and Zhao, 2012):
/// `r = (p - 3)(n - 1) / (n (n - 3))`.
///
/// Zero when `p <= 3` or `n <= 3`; otherwise `0 < r < (p - 3) / (n - 3)`.
pub fn optimal_mean_shrinkage(n: usize, p: usize) -> f64 {
    if p <= 3 || n <= 3 {
        return 0.0;
    }
    let (n, p) = (n as f64, p as f64);
    (p - 3.0) * (n - 1.0) / (n * (n - 3.0))
}

/// Shrinks the column mean `x̄` of one class toward `x̿ 1`, the average of its
/// components: `x̿ 1 + (1 - r / ‖x̄ - x̿ 1‖²)₊ (x̄ - x̿ 1)`, with the norm weighted by
/// the inverse feature variances.
///
/// `coefficient` replaces the closed-form `r` exactly. A zero deviation (always
/// the case for a single feature) leaves the mean unchanged.
pub fn tong_shrunken_mean(x: &Matrix, coefficient: Option<f64>) -> Result<ShrunkenMean> {
    let n = x.nrows();
    let p = x.ncols();

    if let Some(r) = coefficient {
        check_non_negative("mean_shrinkage", r)?;
    }

    let xbar = x
        .mean_axis(Axis(0))
        .ok_or_else(|| DiscrimError::InvalidInput("class without rows".to_string()))?;
    let centered = x - &xbar.view().insert_axis(Axis(0));
    let variances = column_variance(&centered);
    let scale = x.map_axis(Axis(0), |column| column.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())));
    ensure_positive(&variances, &scale, n)?;

    let coefficient = coefficient.unwrap_or_else(|| optimal_mean_shrinkage(n, p));
    let grand = xbar.mean().unwrap_or(0.0);
    let deviation = &xbar - grand;
    let norm = (&deviation * &deviation / &variances).sum();

    let factor = if norm > 0.0 {
        (1.0 - coefficient / norm).max(0.0)
    } else {
        1.0
    };

    debug!(n, p, coefficient, factor, "tong shrunken mean");

    Ok(ShrunkenMean {
        mean: deviation * factor + grand,
        coefficient,
        factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn class_block() -> Matrix {
        array![
            [1.0, 4.0, 2.0, 8.0, 3.0],
            [2.0, 5.0, 1.0, 7.0, 4.0],
            [0.5, 4.5, 2.5, 9.0, 2.0],
            [1.5, 3.0, 1.5, 8.5, 3.5],
            [1.0, 4.2, 2.2, 7.5, 3.1],
            [1.8, 4.8, 1.1, 8.2, 2.6]
        ]
    }

    #[test]
    fn test_optimal_coefficient_bounds() {
        assert_eq!(optimal_mean_shrinkage(10, 3), 0.0);
        assert_eq!(optimal_mean_shrinkage(3, 10), 0.0);

        for n in 4..40 {
            for p in 4..60 {
                let r = optimal_mean_shrinkage(n, p);
                let bound = (p - 3) as f64 / (n - 3) as f64;
                assert!(r > 0.0 && r < bound, "r = {} for n = {}, p = {}", r, n, p);
            }
        }
    }

    #[test]
    fn test_closed_form_shrinkage() {
        let x = class_block();
        let shrunk = tong_shrunken_mean(&x, None).unwrap();
        assert_abs_diff_eq!(shrunk.coefficient, optimal_mean_shrinkage(6, 5), epsilon = 1e-15);
        assert!(shrunk.factor > 0.0 && shrunk.factor <= 1.0);

        let xbar = x.mean_axis(Axis(0)).unwrap();
        let grand = xbar.mean().unwrap();
        let moved = (&shrunk.mean - grand).mapv(f64::abs).sum();
        let original = (&xbar - grand).mapv(f64::abs).sum();
        assert!(moved <= original);
    }

    #[test]
    fn test_override_bypasses_closed_form() {
        let x = class_block();
        let shrunk = tong_shrunken_mean(&x, Some(0.3)).unwrap();
        assert_eq!(shrunk.coefficient, 0.3);

        let xbar = x.mean_axis(Axis(0)).unwrap();
        let variances = x.var_axis(Axis(0), 1.0);
        let grand = xbar.mean().unwrap();
        let norm: f64 = xbar
            .iter()
            .zip(variances.iter())
            .map(|(m, v)| (m - grand) * (m - grand) / v)
            .sum();
        let expected = (&xbar - grand) * (1.0 - 0.3 / norm).max(0.0) + grand;
        assert_abs_diff_eq!(shrunk.mean, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_override_is_raw_mean() {
        let x = class_block();
        let shrunk = tong_shrunken_mean(&x, Some(0.0)).unwrap();
        assert_abs_diff_eq!(shrunk.mean, x.mean_axis(Axis(0)).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_large_override_collapses_to_grand_mean() {
        let x = class_block();
        let shrunk = tong_shrunken_mean(&x, Some(1e9)).unwrap();
        let grand = x.mean_axis(Axis(0)).unwrap().mean().unwrap();
        assert_eq!(shrunk.factor, 0.0);
        assert_abs_diff_eq!(shrunk.mean, Vector::from_elem(5, grand), epsilon = 1e-12);
    }

    #[test]
    fn test_single_feature() {
        let x = array![[1.0], [2.0], [4.0], [5.0]];
        let shrunk = tong_shrunken_mean(&x, None).unwrap();
        assert_eq!(shrunk.coefficient, 0.0);
        assert_abs_diff_eq!(shrunk.mean, array![3.0], epsilon = 1e-12);

        let shrunk = tong_shrunken_mean(&x, Some(2.0)).unwrap();
        assert_eq!(shrunk.factor, 1.0);
        assert_abs_diff_eq!(shrunk.mean, array![3.0], epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_override() {
        assert!(tong_shrunken_mean(&class_block(), Some(-0.1)).is_err());
        assert!(tong_shrunken_mean(&class_block(), Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_constant_feature() {
        let x = array![[1.0, 3.0], [2.0, 3.0], [3.0, 3.0]];
        assert_eq!(
            tong_shrunken_mean(&x, None).unwrap_err(),
            DiscrimError::ZeroVariance { feature: 1 }
        );
    }
}
