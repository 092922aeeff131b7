use super::Residuals;
use crate::error::{DiscrimError, Result};
use crate::linalg::{Cholesky, SymmetricEigen};
use crate::Matrix;
use tracing::debug;

/// Classical pooled within-class covariance, `Σ_k R_kᵀ R_k / (n - k)`.
///
/// Singular whenever `p > n - k`.
pub fn pooled_covariance(residuals: &Residuals) -> Matrix {
    let p = residuals.n_features();
    let dof = residuals.n_samples() - residuals.n_classes();

    let mut scatter = Matrix::zeros((p, p));
    for group in residuals.groups() {
        scatter += &group.t().dot(group);
    }

    scatter / dof as f64
}

/// Unbiased covariance of one centered block.
pub fn sample_covariance(centered: &Matrix) -> Matrix {
    let dof = centered.nrows().saturating_sub(1).max(1);
    centered.t().dot(centered) / dof as f64
}

/// Inverse and log-determinant of a covariance matrix through its Cholesky factor.
pub fn full_precision(covariance: &Matrix) -> Result<(Matrix, f64)> {
    let chol = Cholesky::new(covariance.view())?;
    Ok((chol.inverse(), chol.log_det()))
}

/// Ridge-regularized covariance of the minimum distance empirical Bayes rule
/// (Srivastava and Kubokawa): `Σ + tr(Σ) / min(dof, p) · I`.
pub fn mdeb_covariance(covariance: &Matrix, dof: usize) -> Matrix {
    let p = covariance.nrows();
    let ridge = covariance.diag().sum() / dof.min(p).max(1) as f64;
    debug!(ridge, "mdeb ridge term");
    covariance + &(Matrix::eye(p) * ridge)
}

/// Thomaz regularization: eigenvalues below their mean are raised to the mean,
/// then the spectrum is inverted.
pub fn thomaz_precision(covariance: &Matrix) -> Result<(Matrix, f64)> {
    let eig = SymmetricEigen::new(covariance.view())?;
    let mean = eig.values.mean().unwrap_or(0.0);

    if !(mean > 0.0) {
        return Err(DiscrimError::SingularCovariance {
            index: 0,
            pivot: mean,
        });
    }

    let raised = eig.values.iter().filter(|&&l| l < mean).count();
    debug!(raised, mean, "thomaz eigenvalue floor");

    let precision = eig.reconstruct(|l| 1.0 / l.max(mean));
    let log_det = eig.values.iter().map(|&l| l.max(mean).ln()).sum();
    Ok((precision, log_det))
}
