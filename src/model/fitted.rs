use super::{CovarianceRepresentation, Strategy};
use crate::error::{DiscrimError, Result};
use crate::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything the scorer needs to know about one class.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassStatistics<L> {
    label: L,
    mean: Vector,
    n_samples: usize,
    prior: f64,
    covariance: Arc<CovarianceRepresentation>,
}

impl<L> ClassStatistics<L> {
    pub(crate) fn new(
        label: L,
        mean: Vector,
        n_samples: usize,
        prior: f64,
        covariance: Arc<CovarianceRepresentation>,
    ) -> Self {
        Self {
            label,
            mean,
            n_samples,
            prior,
            covariance,
        }
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn mean(&self) -> &Vector {
        &self.mean
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// Shared with every other class under a pooled strategy.
    pub fn covariance(&self) -> &CovarianceRepresentation {
        &self.covariance
    }
}

/// A fitted classifier. Read-only; safe to share between threads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedModel<L> {
    strategy: Strategy,
    feature_names: Vec<String>,
    classes: Vec<ClassStatistics<L>>,
}

impl<L: PartialEq> FittedModel<L> {
    pub(crate) fn new(
        strategy: Strategy,
        feature_names: Vec<String>,
        classes: Vec<ClassStatistics<L>>,
    ) -> Self {
        Self {
            strategy,
            feature_names,
            classes,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Class statistics in model order, which is the order of first appearance
    /// in the training labels.
    pub fn classes(&self) -> &[ClassStatistics<L>] {
        &self.classes
    }

    pub fn labels(&self) -> Vec<&L> {
        self.classes.iter().map(|c| c.label()).collect()
    }

    pub fn class(&self, label: &L) -> Option<&ClassStatistics<L>> {
        self.classes.iter().find(|c| c.label() == label)
    }

    pub fn priors(&self) -> Vector {
        self.classes.iter().map(|c| c.prior()).collect()
    }

    /// Class means as rows.
    pub fn means(&self) -> Matrix {
        let mut means = Matrix::zeros((self.n_classes(), self.n_features()));
        for (mut row, class) in means.outer_iter_mut().zip(self.classes.iter()) {
            row.assign(class.mean());
        }
        means
    }

    pub(crate) fn check_observations(&self, x: &Matrix) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(DiscrimError::dimension_mismatch(
                format!("{} features", self.n_features()),
                format!("{} features", x.ncols()),
            ));
        }

        if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DiscrimError::NonFiniteValue { row, column });
        }

        Ok(())
    }
}
