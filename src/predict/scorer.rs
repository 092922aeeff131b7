use crate::dataset::Label;
use crate::error::Result;
use crate::model::FittedModel;
use crate::Matrix;
use ndarray::{ArrayView1, Axis};
use tracing::trace;

impl<L: Label> FittedModel<L> {
    /// Discriminant score of every row against every class, `n_new × k` in class order.
    ///
    /// `score_k(x) = -½ (x - μ_k)ᵀ M_k (x - μ_k) - ½ log|Σ_k| + ln π_k`, where `M_k`
    /// is whatever inverse the class's [`CovarianceRepresentation`](crate::CovarianceRepresentation)
    /// holds. Larger is better.
    pub fn scores(&self, x: &Matrix) -> Result<Matrix> {
        self.check_observations(x)?;

        let mut scores = Matrix::zeros((x.nrows(), self.n_classes()));
        for (k, class) in self.classes().iter().enumerate() {
            let log_prior = class.prior().ln();
            let centered = x - &class.mean().view().insert_axis(Axis(0));

            for (i, row) in centered.outer_iter().enumerate() {
                scores[[i, k]] = class.covariance().discriminant(row, log_prior);
            }
            trace!(class = k, log_prior, "scored class");
        }

        Ok(scores)
    }

    /// Labels of the highest-scoring class per row.
    pub fn predict_classes(&self, x: &Matrix) -> Result<Vec<L>> {
        let scores = self.scores(x)?;
        let classes = self.classes();

        Ok(scores
            .outer_iter()
            .zip(x.outer_iter())
            .map(|(row, observation)| {
                let best = if row.iter().all(|&s| s == f64::NEG_INFINITY) {
                    self.dominant_class(observation).unwrap_or(0)
                } else {
                    argmax(row)
                };
                classes[best].label().clone()
            })
            .collect())
    }

    /// Class that wins as the observation is pushed further along its own
    /// direction, for rows so distant that every score has overflowed.
    ///
    /// With `u = x / max|x|`, classes are ranked by the smallest `uᵀ M_k u` and
    /// then by the largest `uᵀ M_k μ_k`, which are the leading terms of the score
    /// as the scale grows. Classes with a zero prior never win; `None` when no
    /// class is left.
    pub(crate) fn dominant_class(&self, observation: ArrayView1<f64>) -> Option<usize> {
        let scale = observation.fold(0.0_f64, |m, v| m.max(v.abs()));
        let direction = if scale > 0.0 {
            &observation / scale
        } else {
            observation.to_owned()
        };

        let mut best: Option<(usize, (f64, f64))> = None;
        for (k, class) in self.classes().iter().enumerate() {
            if !(class.prior() > 0.0) {
                continue;
            }

            let covariance = class.covariance();
            let key = (
                -covariance.quadratic_form(direction.view()),
                covariance.bilinear_form(direction.view(), class.mean().view()),
            );
            if key.0.is_nan() || key.1.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, top)| key > top) {
                best = Some((k, key));
            }
        }

        best.map(|(k, _)| k)
    }
}

/// Index of the largest entry; the earliest one wins a tie.
pub(crate) fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (k, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = k;
        }
    }
    best
}
