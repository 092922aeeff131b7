use super::check_non_negative;
use crate::error::Result;
use crate::linalg::SymmetricEigen;
use crate::Matrix;
use tracing::debug;

/// Moore-Penrose pseudo-inverse of a symmetric matrix.
#[derive(Clone, Debug)]
pub struct PseudoInverse {
    pub inverse: Matrix,
    /// Number of eigenvalues kept.
    pub rank: usize,
    /// Log of the product of the kept eigenvalues.
    pub log_pdet: f64,
}

/// Inverts the eigenvalues whose magnitude exceeds `tolerance` times the largest
/// one and drops the rest. Equals the ordinary inverse for a full-rank matrix.
pub fn pseudo_inverse(matrix: &Matrix, tolerance: f64) -> Result<PseudoInverse> {
    check_non_negative("pinv_tolerance", tolerance)?;

    let eig = SymmetricEigen::new(matrix.view())?;
    let largest = eig.values.iter().fold(0.0_f64, |acc, &l| acc.max(l.abs()));
    let cutoff = tolerance * largest;
    let keep = |l: f64| largest > 0.0 && l.abs() > cutoff;

    let rank = eig.values.iter().filter(|&&l| keep(l)).count();
    let log_pdet = eig
        .values
        .iter()
        .filter(|&&l| keep(l))
        .map(|l| l.abs().ln())
        .sum::<f64>();
    let inverse = eig.reconstruct(|l| if keep(l) { 1.0 / l } else { 0.0 });

    debug!(rank, dim = matrix.nrows(), cutoff, "pseudo-inverse spectrum truncated");

    Ok(PseudoInverse {
        inverse,
        rank,
        log_pdet,
    })
}
