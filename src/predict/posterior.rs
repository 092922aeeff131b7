use crate::dataset::Label;
use crate::error::{DiscrimError, Result};
use crate::model::FittedModel;
use crate::Matrix;
use ndarray::Axis;
use tracing::{debug, trace};

impl<L: Label> FittedModel<L> {
    /// Posterior class probabilities, `n_new × k` in class order. Each row sums to 1.
    ///
    /// The joint log-density `ln N(x | μ_k, Σ_k) + ln π_k` of every class is
    /// normalized with log-sum-exp, so very distant observations still produce
    /// a distribution instead of `0 / 0`. When the densities themselves
    /// overflow, the row puts all its mass on the class that dominates the
    /// tail (see `predict_classes`).
    ///
    /// # Errors
    ///
    /// [`DiscrimError::DegeneratePosterior`] when a row has no class with a
    /// positive prior and a finite score.
    pub fn predict_proba(&self, x: &Matrix) -> Result<Matrix> {
        let mut joint = self.joint_log_density(x)?;

        for (i, mut row) in joint.outer_iter_mut().enumerate() {
            let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            if max.is_nan() {
                return Err(DiscrimError::DegeneratePosterior { row: i });
            }
            if max == f64::NEG_INFINITY {
                let best = self
                    .dominant_class(x.row(i))
                    .ok_or(DiscrimError::DegeneratePosterior { row: i })?;
                debug!(row = i, class = best, "joint log-density overflowed, using tail ranking");
                row.fill(0.0);
                row[best] = 1.0;
                continue;
            }

            row.mapv_inplace(|v| (v - max).exp());
            let total = row.sum();
            row /= total;
        }

        Ok(joint)
    }

    fn joint_log_density(&self, x: &Matrix) -> Result<Matrix> {
        self.check_observations(x)?;

        let mut joint = Matrix::zeros((x.nrows(), self.n_classes()));
        for (k, class) in self.classes().iter().enumerate() {
            let log_prior = class.prior().ln();
            let centered = x - &class.mean().view().insert_axis(Axis(0));

            for (i, row) in centered.outer_iter().enumerate() {
                joint[[i, k]] = class.covariance().log_density(row) + log_prior;
            }
        }
        trace!(rows = x.nrows(), classes = self.n_classes(), "joint log-density");

        Ok(joint)
    }
}
