//! Dense kernels for small symmetric matrices: Cholesky factorization and a
//! cyclic Jacobi eigendecomposition.

use crate::error::{DiscrimError, Result};
use crate::{Matrix, Vector};
use ndarray::{ArrayView1, ArrayView2, Axis};
use std::cmp::Ordering;
use tracing::trace;

const MAX_SWEEPS: usize = 100;

/// Off-diagonal mass, relative to the Frobenius norm, at which Jacobi stops.
const JACOBI_TOLERANCE: f64 = 1e-13;

/// A pivot below this fraction of its own diagonal entry marks a singular matrix.
///
/// The ratio `pivot / a_jj` is `1 - R²` of column `j` against the earlier
/// columns, so the test does not depend on how the columns are scaled.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Lower-triangular factor `L` of a symmetric positive definite matrix `A = L Lᵀ`.
#[derive(Clone, Debug)]
pub struct Cholesky {
    lower: Matrix,
}

impl Cholesky {
    pub fn new(matrix: ArrayView2<f64>) -> Result<Self> {
        let n = check_square(matrix)?;

        let mut lower = Matrix::zeros((n, n));
        for j in 0..n {
            let mut pivot = matrix[[j, j]];
            for k in 0..j {
                pivot -= lower[[j, k]] * lower[[j, k]];
            }

            if !(pivot > 0.0 && pivot > PIVOT_TOLERANCE * matrix[[j, j]]) {
                return Err(DiscrimError::SingularCovariance { index: j, pivot });
            }

            let root = pivot.sqrt();
            lower[[j, j]] = root;

            for i in (j + 1)..n {
                let mut sum = matrix[[i, j]];
                for k in 0..j {
                    sum -= lower[[i, k]] * lower[[j, k]];
                }
                lower[[i, j]] = sum / root;
            }
        }

        Ok(Self { lower })
    }

    pub fn lower(&self) -> &Matrix {
        &self.lower
    }

    pub fn log_det(&self) -> f64 {
        2.0 * self.lower.diag().iter().map(|d| d.ln()).sum::<f64>()
    }

    /// Solves `A x = b`.
    pub fn solve(&self, b: ArrayView1<f64>) -> Vector {
        let n = self.lower.nrows();

        let mut y = Vector::zeros(n);
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.lower[[i, k]] * y[k];
            }
            y[i] = sum / self.lower[[i, i]];
        }

        let mut x = Vector::zeros(n);
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in (i + 1)..n {
                sum -= self.lower[[k, i]] * x[k];
            }
            x[i] = sum / self.lower[[i, i]];
        }

        x
    }

    /// Solves `A X = B` column by column.
    pub fn solve_matrix(&self, b: ArrayView2<f64>) -> Matrix {
        let mut x = Matrix::zeros(b.raw_dim());
        for (j, column) in b.axis_iter(Axis(1)).enumerate() {
            x.column_mut(j).assign(&self.solve(column));
        }
        x
    }

    pub fn inverse(&self) -> Matrix {
        let n = self.lower.nrows();
        self.solve_matrix(Matrix::eye(n).view())
    }
}

/// Eigenvalues (descending) and matching eigenvectors (columns) of a symmetric matrix.
#[derive(Clone, Debug)]
pub struct SymmetricEigen {
    pub values: Vector,
    pub vectors: Matrix,
}

impl SymmetricEigen {
    pub fn new(matrix: ArrayView2<f64>) -> Result<Self> {
        let n = check_square(matrix)?;
        let mut a = matrix.to_owned();
        let mut v = Matrix::eye(n);

        let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let tol = JACOBI_TOLERANCE * scale;
        let mut converged = scale == 0.0;

        for sweep in 0..MAX_SWEEPS {
            if converged {
                break;
            }

            let off = off_diagonal_norm(&a);
            trace!(sweep, off, "jacobi sweep");
            if off <= tol {
                converged = true;
                break;
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let apq = a[[p, q]];
                    if apq == 0.0 {
                        continue;
                    }

                    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                    let c = 1.0 / (t * t + 1.0).sqrt();
                    let s = t * c;

                    for k in 0..n {
                        let akp = a[[k, p]];
                        let akq = a[[k, q]];
                        a[[k, p]] = c * akp - s * akq;
                        a[[k, q]] = s * akp + c * akq;
                    }
                    for k in 0..n {
                        let apk = a[[p, k]];
                        let aqk = a[[q, k]];
                        a[[p, k]] = c * apk - s * aqk;
                        a[[q, k]] = s * apk + c * aqk;
                    }
                    for k in 0..n {
                        let vkp = v[[k, p]];
                        let vkq = v[[k, q]];
                        v[[k, p]] = c * vkp - s * vkq;
                        v[[k, q]] = s * vkp + c * vkq;
                    }
                }
            }
        }

        if !converged && off_diagonal_norm(&a) > tol {
            return Err(DiscrimError::NoConvergence { sweeps: MAX_SWEEPS });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| a[[j, j]].partial_cmp(&a[[i, i]]).unwrap_or(Ordering::Equal));

        let values: Vector = order.iter().map(|&i| a[[i, i]]).collect();
        let vectors = v.select(Axis(1), &order);

        Ok(Self { values, vectors })
    }

    /// Rebuilds `U diag(f(λ)) Uᵀ`.
    pub fn reconstruct(&self, f: impl Fn(f64) -> f64) -> Matrix {
        let weights = self.values.mapv(f);
        let scaled = &self.vectors * &weights.view().insert_axis(Axis(0));
        scaled.dot(&self.vectors.t())
    }
}

fn off_diagonal_norm(a: &Matrix) -> f64 {
    a.indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, x)| x * x)
        .sum::<f64>()
        .sqrt()
}

fn check_square(matrix: ArrayView2<f64>) -> Result<usize> {
    if matrix.nrows() != matrix.ncols() {
        return Err(DiscrimError::dimension_mismatch(
            "square matrix",
            format!("{}x{}", matrix.nrows(), matrix.ncols()),
        ));
    }
    Ok(matrix.nrows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_cholesky_factor() {
        let a = array![[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]];
        let chol = Cholesky::new(a.view()).unwrap();
        let l = chol.lower();

        assert_abs_diff_eq!(l.dot(&l.t()), a, epsilon = 1e-12);
        assert_eq!(l[[0, 1]], 0.0);
    }

    #[test]
    fn test_cholesky_inverse_and_log_det() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let chol = Cholesky::new(a.view()).unwrap();

        assert_abs_diff_eq!(chol.inverse().dot(&a), Matrix::eye(2), epsilon = 1e-12);
        assert_abs_diff_eq!(chol.log_det(), 5.0_f64.ln(), epsilon = 1e-12);

        let x = chol.solve(array![1.0, 2.0].view());
        assert_abs_diff_eq!(a.dot(&x), array![1.0, 2.0], epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let err = Cholesky::new(a.view()).unwrap_err();
        assert!(matches!(err, DiscrimError::SingularCovariance { index: 1, .. }));
    }

    #[test]
    fn test_cholesky_mixed_scales() {
        // income-sized variance next to a ratio, correlation about 0.62
        let a = array![[5.16e9, 4854.0], [4854.0, 0.0117]];
        let chol = Cholesky::new(a.view()).unwrap();

        let l = chol.lower();
        assert_abs_diff_eq!(l[[1, 1]] * l[[1, 1]], 0.0117 - 4854.0 * 4854.0 / 5.16e9, epsilon = 1e-12);
        let identity = chol.inverse().dot(&a);
        assert_abs_diff_eq!(identity, Matrix::eye(2), epsilon = 1e-6);
    }

    #[test]
    fn test_cholesky_collinear_after_scaling() {
        let a = array![[1e8, 1e2], [1e2, 1e-4]];
        let err = Cholesky::new(a.view()).unwrap_err();
        assert!(matches!(err, DiscrimError::SingularCovariance { index: 1, .. }));
    }

    #[test]
    fn test_cholesky_not_square() {
        let a = array![[1.0, 2.0, 3.0], [2.0, 4.0, 5.0]];
        assert!(Cholesky::new(a.view()).is_err());
    }

    #[test]
    fn test_eigen_diagonal() {
        let a = array![[1.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 2.0]];
        let eig = SymmetricEigen::new(a.view()).unwrap();
        assert_abs_diff_eq!(eig.values, array![3.0, 2.0, 1.0], epsilon = 1e-14);
    }

    #[test]
    fn test_eigen_reconstruction() {
        let a = array![
            [4.0, 1.0, 0.5, 0.0],
            [1.0, 3.0, 0.2, 0.1],
            [0.5, 0.2, 2.0, 0.3],
            [0.0, 0.1, 0.3, 1.0]
        ];
        let eig = SymmetricEigen::new(a.view()).unwrap();

        assert_abs_diff_eq!(eig.reconstruct(|x| x), a, epsilon = 1e-10);
        assert_abs_diff_eq!(
            eig.vectors.t().dot(&eig.vectors),
            Matrix::eye(4),
            epsilon = 1e-10
        );
        for w in eig.values.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_eigen_rank_deficient() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let eig = SymmetricEigen::new(a.view()).unwrap();
        assert_abs_diff_eq!(eig.values, array![2.0, 0.0], epsilon = 1e-12);
    }

    #[test]
    fn test_eigen_zero_matrix() {
        let eig = SymmetricEigen::new(Matrix::zeros((3, 3)).view()).unwrap();
        assert_eq!(eig.values, Vector::zeros(3));
        assert_eq!(eig.vectors, Matrix::eye(3));
    }
}
