use crate::{Matrix, Vector};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How a fitted dispersion estimate is stored and applied to a centered vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CovarianceRepresentation {
    /// Exact inverse of a full covariance matrix.
    FullMatrix { precision: Matrix, log_det: f64 },
    /// Independent features.
    DiagonalVector { variances: Vector },
    /// Analytic precision of a shrinkage covariance.
    ShrinkagePrecision {
        precision: Matrix,
        log_det: f64,
        lambda: f64,
        lambda_var: f64,
    },
    /// Moore-Penrose inverse of a possibly singular covariance.
    PseudoInverse {
        inverse: Matrix,
        log_pdet: f64,
        rank: usize,
    },
}

impl CovarianceRepresentation {
    pub fn dim(&self) -> usize {
        match self {
            CovarianceRepresentation::FullMatrix { precision, .. }
            | CovarianceRepresentation::ShrinkagePrecision { precision, .. } => precision.nrows(),
            CovarianceRepresentation::DiagonalVector { variances } => variances.len(),
            CovarianceRepresentation::PseudoInverse { inverse, .. } => inverse.nrows(),
        }
    }

    /// `vᵀ Σ⁻¹ v`, with `Σ⁻¹` replaced by whatever inverse the variant holds.
    pub fn quadratic_form(&self, centered: ArrayView1<f64>) -> f64 {
        self.bilinear_form(centered, centered)
    }

    /// `aᵀ Σ⁻¹ b`.
    pub fn bilinear_form(&self, left: ArrayView1<f64>, right: ArrayView1<f64>) -> f64 {
        match self {
            CovarianceRepresentation::FullMatrix { precision, .. }
            | CovarianceRepresentation::ShrinkagePrecision { precision, .. } => {
                left.dot(&precision.dot(&right))
            }
            CovarianceRepresentation::PseudoInverse { inverse, .. } => left.dot(&inverse.dot(&right)),
            CovarianceRepresentation::DiagonalVector { variances } => left
                .iter()
                .zip(right.iter())
                .zip(variances.iter())
                .map(|((a, b), s)| a * b / s)
                .sum(),
        }
    }

    /// Log-determinant of the covariance; the pseudo-determinant for `PseudoInverse`.
    pub fn log_determinant(&self) -> f64 {
        match self {
            CovarianceRepresentation::FullMatrix { log_det, .. }
            | CovarianceRepresentation::ShrinkagePrecision { log_det, .. } => *log_det,
            CovarianceRepresentation::DiagonalVector { variances } => {
                variances.iter().map(|s| s.ln()).sum()
            }
            CovarianceRepresentation::PseudoInverse { log_pdet, .. } => *log_pdet,
        }
    }

    /// `-½ (vᵀ Σ⁻¹ v + log|Σ|) + log π`.
    pub fn discriminant(&self, centered: ArrayView1<f64>, log_prior: f64) -> f64 {
        -0.5 * (self.quadratic_form(centered) + self.log_determinant()) + log_prior
    }

    /// Multivariate normal log-density of a centered observation. A pseudo-inverse
    /// evaluates the degenerate density on its retained subspace.
    pub fn log_density(&self, centered: ArrayView1<f64>) -> f64 {
        let dim = match self {
            CovarianceRepresentation::PseudoInverse { rank, .. } => *rank,
            _ => self.dim(),
        };
        -0.5 * (self.quadratic_form(centered) + self.log_determinant() + dim as f64 * (2.0 * PI).ln())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CovarianceRepresentation::FullMatrix { .. } => "full_matrix",
            CovarianceRepresentation::DiagonalVector { .. } => "diagonal_vector",
            CovarianceRepresentation::ShrinkagePrecision { .. } => "shrinkage_precision",
            CovarianceRepresentation::PseudoInverse { .. } => "pseudo_inverse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_matches_full() {
        let diagonal = CovarianceRepresentation::DiagonalVector {
            variances: array![2.0, 0.5],
        };
        let full = CovarianceRepresentation::FullMatrix {
            precision: array![[0.5, 0.0], [0.0, 2.0]],
            log_det: 1.0_f64.ln(),
        };
        let v = array![1.0, -2.0];

        assert_abs_diff_eq!(diagonal.quadratic_form(v.view()), 8.5, epsilon = 1e-12);
        assert_abs_diff_eq!(
            diagonal.quadratic_form(v.view()),
            full.quadratic_form(v.view()),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(diagonal.log_determinant(), full.log_determinant(), epsilon = 1e-12);
        assert_eq!(diagonal.dim(), 2);
    }

    #[test]
    fn test_bilinear_form() {
        let full = CovarianceRepresentation::FullMatrix {
            precision: array![[2.0, 1.0], [1.0, 3.0]],
            log_det: 5.0_f64.ln(),
        };
        let diagonal = CovarianceRepresentation::DiagonalVector {
            variances: array![0.5, 4.0],
        };
        let (a, b) = (array![1.0, 2.0], array![-1.0, 1.0]);

        assert_abs_diff_eq!(full.bilinear_form(a.view(), b.view()), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(full.bilinear_form(a.view(), b.view()), full.bilinear_form(b.view(), a.view()), epsilon = 1e-12);
        assert_abs_diff_eq!(diagonal.bilinear_form(a.view(), b.view()), -1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_discriminant() {
        let repr = CovarianceRepresentation::DiagonalVector {
            variances: array![1.0],
        };
        let score = repr.discriminant(array![2.0].view(), 0.5_f64.ln());
        assert_abs_diff_eq!(score, -2.0 + 0.5_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_standard_normal_density() {
        let repr = CovarianceRepresentation::FullMatrix {
            precision: Matrix::eye(2),
            log_det: 0.0,
        };
        let density = repr.log_density(array![0.0, 0.0].view()).exp();
        assert_abs_diff_eq!(density, 1.0 / (2.0 * PI), epsilon = 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_density_uses_rank() {
        let repr = CovarianceRepresentation::PseudoInverse {
            inverse: array![[1.0, 0.0], [0.0, 0.0]],
            log_pdet: 0.0,
            rank: 1,
        };
        let density = repr.log_density(array![0.0, 5.0].view()).exp();
        assert_abs_diff_eq!(density, 1.0 / (2.0 * PI).sqrt(), epsilon = 1e-12);
        assert_eq!(repr.kind(), "pseudo_inverse");
    }
}
