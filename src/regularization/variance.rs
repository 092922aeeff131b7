use super::Residuals;
use crate::error::{DiscrimError, Result};
use crate::{Matrix, Vector};
use ndarray::Axis;

/// Per-feature variance pooled over all classes, with `n - k` degrees of freedom.
pub fn pooled_variance(residuals: &Residuals) -> Result<Vector> {
    let n = residuals.n_samples();
    let k = residuals.n_classes();

    let mut sum_sq = Vector::zeros(residuals.n_features());
    for group in residuals.groups() {
        sum_sq += &group.mapv(|r| r * r).sum_axis(Axis(0));
    }

    let variances = sum_sq / (n - k) as f64;
    ensure_positive(&variances, residuals.scale(), n)?;
    Ok(variances)
}

/// Per-feature variance of one class block, with `n_k - 1` degrees of freedom.
pub fn class_variance(residuals: &Residuals, class: usize) -> Result<Vector> {
    let group = &residuals.groups()[class];
    let variances = column_variance(group);
    ensure_positive(&variances, residuals.scale(), group.nrows())?;
    Ok(variances)
}

pub(crate) fn column_variance(centered: &Matrix) -> Vector {
    let dof = centered.nrows().saturating_sub(1).max(1);
    centered.mapv(|r| r * r).sum_axis(Axis(0)) / dof as f64
}

/// Fails on the first feature whose variance is indistinguishable from rounding
/// noise in residuals of values as large as `scale`.
pub(crate) fn ensure_positive(variances: &Vector, scale: &Vector, rows: usize) -> Result<()> {
    for (feature, (&v, &s)) in variances.iter().zip(scale.iter()).enumerate() {
        if !(v > rounding_floor(s, rows)) {
            return Err(DiscrimError::ZeroVariance { feature });
        }
    }
    Ok(())
}

fn rounding_floor(scale: f64, rows: usize) -> f64 {
    let eps = 8.0 * f64::EPSILON * scale;
    rows as f64 * eps * eps
}
