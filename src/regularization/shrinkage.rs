use super::variance::ensure_positive;
use super::{check_intensity, Residuals};
use crate::error::{DiscrimError, Result};
use crate::linalg::{Cholesky, SymmetricEigen};
use crate::{Matrix, Vector};
use ndarray::Axis;
use std::cmp::Ordering;
use tracing::debug;

/// Schafer-Strimmer shrinkage estimate of a covariance matrix and its precision.
#[derive(Clone, Debug)]
pub struct ShrinkageEstimate {
    pub covariance: Matrix,
    pub precision: Matrix,
    pub log_det: f64,
    /// Correlation shrinkage intensity toward the identity.
    pub lambda: f64,
    /// Variance shrinkage intensity toward the median variance.
    pub lambda_var: f64,
}

/// Shrinks correlations toward the identity and variances toward their median,
/// each with a data-driven intensity unless an override is given.
///
/// The precision is derived analytically from the shrunk correlation: through the
/// Woodbury identity when there are no more rows than features, through the
/// shrunk spectrum of the sample correlation otherwise. The shrunk covariance is
/// never inverted, so a singular sample correlation is expected and absorbed
/// whenever `lambda > 0`.
pub fn schafer_strimmer(
    residuals: &Residuals,
    lambda: Option<f64>,
    lambda_var: Option<f64>,
) -> Result<ShrinkageEstimate> {
    if let Some(lambda) = lambda {
        check_intensity("correlation_shrinkage", lambda)?;
    }
    if let Some(lambda_var) = lambda_var {
        check_intensity("variance_shrinkage", lambda_var)?;
    }

    let x = residuals.stacked();
    let n = x.nrows();
    let p = x.ncols();
    if n < 2 {
        return Err(DiscrimError::InvalidInput(
            "shrinkage estimation needs at least 2 observations".to_string(),
        ));
    }
    let nf = n as f64;

    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| DiscrimError::InvalidInput("empty residual matrix".to_string()))?;
    let xc = &x - &mean.view().insert_axis(Axis(0));

    let w = xc.mapv(|v| v * v);
    let w_bar = w.sum_axis(Axis(0)) / nf;
    let variances = &w_bar * (nf / (nf - 1.0));
    ensure_positive(&variances, residuals.scale(), n)?;

    let target = median(&variances);
    let lambda_var = lambda_var.unwrap_or_else(|| variance_intensity(&w, &w_bar, &variances, target));
    let shrunk_var = variances.mapv(|v| lambda_var * target + (1.0 - lambda_var) * v);

    let sd = variances.mapv(f64::sqrt);
    let z = &xc / &sd.view().insert_axis(Axis(0));
    let gram = z.t().dot(&z);
    let corr = &gram / (nf - 1.0);
    let lambda = lambda.unwrap_or_else(|| correlation_intensity(&z, &gram, &corr));

    debug!(lambda, lambda_var, n, p, "schafer-strimmer shrinkage intensities");

    let mut shrunk_corr = &corr * (1.0 - lambda);
    shrunk_corr.diag_mut().fill(1.0);

    let (corr_inverse, corr_log_det) = shrunk_correlation_inverse(&z, &corr, lambda)?;

    let sd_star = shrunk_var.mapv(f64::sqrt);
    let outer_sd = outer(&sd_star, &sd_star);
    let covariance = &shrunk_corr * &outer_sd;
    let precision = &corr_inverse / &outer_sd;
    let log_det = shrunk_var.iter().map(|v| v.ln()).sum::<f64>() + corr_log_det;

    Ok(ShrinkageEstimate {
        covariance,
        precision,
        log_det,
        lambda,
        lambda_var,
    })
}


/// `Σ Var(v_j) / Σ (v_j - target)²`, clipped to [0, 1].
fn variance_intensity(w: &Matrix, w_bar: &Vector, variances: &Vector, target: f64) -> f64 {
    let nf = w.nrows() as f64;
    let spread = (w - &w_bar.view().insert_axis(Axis(0)))
        .mapv(|d| d * d)
        .sum_axis(Axis(0));
    let numerator = spread.sum() * nf / (nf - 1.0).powi(3);
    let denominator = variances.mapv(|v| (v - target) * (v - target)).sum();
    clip_intensity(numerator, denominator)
}

/// `Σ_{i≠j} Var(r_ij) / Σ_{i≠j} r_ij²`, clipped to [0, 1].
fn correlation_intensity(z: &Matrix, gram: &Matrix, corr: &Matrix) -> f64 {
    let nf = z.nrows() as f64;
    let z2 = z.mapv(|v| v * v);
    let second_moment = z2.t().dot(&z2);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for ((i, j), &r) in corr.indexed_iter() {
        if i == j {
            continue;
        }
        let w_bar = gram[[i, j]] / nf;
        let spread = second_moment[[i, j]] - nf * w_bar * w_bar;
        numerator += spread.max(0.0) * nf / (nf - 1.0).powi(3);
        denominator += r * r;
    }

    clip_intensity(numerator, denominator)
}

fn clip_intensity(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        (numerator / denominator).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Inverse and log-determinant of `(1 - λ) R + λ I` for `R = ZᵀZ / (n - 1)`.
fn shrunk_correlation_inverse(z: &Matrix, corr: &Matrix, lambda: f64) -> Result<(Matrix, f64)> {
    let n = z.nrows();
    let p = z.ncols();
    let nf = n as f64;

    if lambda >= 1.0 {
        return Ok((Matrix::eye(p), 0.0));
    }

    if n <= p {
        if lambda <= 0.0 {
            // rank(R) <= n - 1 < p
            return Err(DiscrimError::SingularCovariance {
                index: n.saturating_sub(1),
                pivot: 0.0,
            });
        }

        let c = lambda * (nf - 1.0) / (1.0 - lambda);
        let m = z.dot(&z.t()) + &(Matrix::eye(n) * c);
        let chol = Cholesky::new(m.view())?;
        let projected = z.t().dot(&chol.solve_matrix(z.view()));

        let inverse = (Matrix::eye(p) - &projected) / lambda;
        let log_det = p as f64 * lambda.ln() + chol.log_det() - nf * c.ln();
        return Ok((inverse, log_det));
    }

    let eig = SymmetricEigen::new(corr.view())?;
    let shrunk = eig.values.mapv(|e| (1.0 - lambda) * e.max(0.0) + lambda);
    let largest = shrunk.iter().fold(0.0_f64, |acc, &e| acc.max(e));
    if let Some((index, &pivot)) = shrunk
        .iter()
        .enumerate()
        .find(|(_, e)| !(**e > 1e-12 * largest))
    {
        return Err(DiscrimError::SingularCovariance { index, pivot });
    }

    let inverse = eig.reconstruct(|e| 1.0 / ((1.0 - lambda) * e.max(0.0) + lambda));
    let log_det = shrunk.iter().map(|e| e.ln()).sum();
    Ok((inverse, log_det))
}

fn outer(a: &Vector, b: &Vector) -> Matrix {
    let column = a.view().insert_axis(Axis(1));
    let row = b.view().insert_axis(Axis(0));
    column.dot(&row)
}

fn median(values: &Vector) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}
