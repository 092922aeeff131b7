use super::{ClassStatistics, CovarianceRepresentation, FitOptions, FittedModel, Strategy};
use crate::dataset::{Dataset, Label};
use crate::error::{DiscrimError, Result};
use crate::regularization::{
    class_variance, full_precision, mdeb_covariance, pooled_covariance, pooled_variance,
    pseudo_inverse, sample_covariance, schafer_strimmer, thomaz_precision, tong_shrunken_mean,
    Residuals,
};
use crate::{Matrix, Vector};
use ndarray::Axis;
use std::sync::Arc;
use tracing::debug;

/// Supplied priors may miss a total of 1 by this much before being rejected.
const PRIOR_TOLERANCE: f64 = 1e-8;

/// Builder for a Gaussian discriminant classifier.
#[derive(Clone, Debug)]
pub struct DiscriminantAnalysis {
    strategy: Strategy,
    priors: Option<Vec<f64>>,
    options: FitOptions,
}

impl DiscriminantAnalysis {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            priors: None,
            options: FitOptions::default(),
        }
    }

    /// Class priors in first-appearance order. Estimated from class sizes when unset.
    pub fn priors(mut self, priors: Vec<f64>) -> Self {
        self.priors = Some(priors);
        self
    }

    pub fn options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pinv_tolerance(mut self, tolerance: f64) -> Self {
        self.options.pinv_tolerance = tolerance;
        self
    }

    pub fn correlation_shrinkage(mut self, lambda: f64) -> Self {
        self.options.correlation_shrinkage = Some(lambda);
        self
    }

    pub fn variance_shrinkage(mut self, lambda_var: f64) -> Self {
        self.options.variance_shrinkage = Some(lambda_var);
        self
    }

    pub fn mean_shrinkage(mut self, coefficient: f64) -> Self {
        self.options.mean_shrinkage = Some(coefficient);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn fit_options(&self) -> &FitOptions {
        &self.options
    }

    /// Normalizes `x` and `y` into a [`Dataset`] and fits it.
    pub fn fit_arrays<L: Label>(&self, x: &Matrix, y: &[L]) -> Result<FittedModel<L>> {
        let dataset = Dataset::new(x.clone(), y.to_vec())?;
        self.fit(&dataset)
    }

    pub fn fit<L: Label>(&self, data: &Dataset<L>) -> Result<FittedModel<L>> {
        self.options.validate()?;

        let partition = data.partition();
        let n_samples = data.n_samples();

        for (label, rows) in &partition {
            if rows.len() < 2 {
                return Err(DiscrimError::InsufficientObservations {
                    class: format!("{:?}", label),
                    count: rows.len(),
                });
            }
        }

        let counts: Vec<usize> = partition.iter().map(|(_, rows)| rows.len()).collect();
        let priors = resolve_priors(self.priors.as_deref(), &counts, n_samples)?;

        let groups: Vec<Matrix> = partition
            .iter()
            .map(|(_, rows)| data.features().select(Axis(0), rows))
            .collect();
        let residuals = Residuals::center(&groups)?;

        let means = self.class_means(&groups, &residuals)?;
        let dispersion = self.dispersion(&residuals)?;

        debug!(
            strategy = %self.strategy,
            n = n_samples,
            p = data.n_features(),
            k = partition.len(),
            representation = dispersion.first().map(|d| d.kind()).unwrap_or("none"),
            "fitted discriminant model"
        );

        let classes = partition
            .into_iter()
            .zip(means)
            .zip(priors)
            .zip(dispersion)
            .map(|((((label, rows), mean), prior), covariance)| {
                ClassStatistics::new(label, mean, rows.len(), prior, covariance)
            })
            .collect();

        Ok(FittedModel::new(
            self.strategy,
            data.feature_names().to_vec(),
            classes,
        ))
    }

    fn class_means(&self, groups: &[Matrix], residuals: &Residuals) -> Result<Vec<Vector>> {
        if !self.strategy.shrinks_means() {
            return Ok(residuals.means().to_vec());
        }

        groups
            .iter()
            .map(|group| tong_shrunken_mean(group, self.options.mean_shrinkage).map(|s| s.mean))
            .collect()
    }

    /// One representation per class; pooled strategies share a single one.
    fn dispersion(&self, residuals: &Residuals) -> Result<Vec<Arc<CovarianceRepresentation>>> {
        let k = residuals.n_classes();

        let pooled = match self.strategy {
            Strategy::Dqda | Strategy::SmDqda => {
                return per_class(k, |class| {
                    Ok(CovarianceRepresentation::DiagonalVector {
                        variances: class_variance(residuals, class)?,
                    })
                });
            }
            Strategy::Qda => {
                return per_class(k, |class| {
                    let covariance = sample_covariance(&residuals.groups()[class]);
                    let (precision, log_det) = full_precision(&covariance)?;
                    Ok(CovarianceRepresentation::FullMatrix { precision, log_det })
                });
            }
            Strategy::Dlda | Strategy::SmDlda => CovarianceRepresentation::DiagonalVector {
                variances: pooled_variance(residuals)?,
            },
            Strategy::Lda => {
                let (precision, log_det) = full_precision(&pooled_covariance(residuals))?;
                CovarianceRepresentation::FullMatrix { precision, log_det }
            }
            Strategy::LdaSchafer => {
                let estimate = schafer_strimmer(
                    residuals,
                    self.options.correlation_shrinkage,
                    self.options.variance_shrinkage,
                )?;
                CovarianceRepresentation::ShrinkagePrecision {
                    precision: estimate.precision,
                    log_det: estimate.log_det,
                    lambda: estimate.lambda,
                    lambda_var: estimate.lambda_var,
                }
            }
            Strategy::LdaPseudo => {
                let pinv = pseudo_inverse(&pooled_covariance(residuals), self.options.pinv_tolerance)?;
                CovarianceRepresentation::PseudoInverse {
                    inverse: pinv.inverse,
                    log_pdet: pinv.log_pdet,
                    rank: pinv.rank,
                }
            }
            Strategy::LdaThomaz => {
                let (precision, log_det) = thomaz_precision(&pooled_covariance(residuals))?;
                CovarianceRepresentation::FullMatrix { precision, log_det }
            }
            Strategy::Mdeb => {
                let dof = residuals.n_samples() - residuals.n_classes();
                let covariance = mdeb_covariance(&pooled_covariance(residuals), dof);
                let (precision, log_det) = full_precision(&covariance)?;
                CovarianceRepresentation::FullMatrix { precision, log_det }
            }
        };

        Ok(vec![Arc::new(pooled); k])
    }
}

fn per_class(
    k: usize,
    estimate: impl Fn(usize) -> Result<CovarianceRepresentation>,
) -> Result<Vec<Arc<CovarianceRepresentation>>> {
    (0..k).map(|class| estimate(class).map(Arc::new)).collect()
}

fn resolve_priors(supplied: Option<&[f64]>, counts: &[usize], n_samples: usize) -> Result<Vec<f64>> {
    let Some(priors) = supplied else {
        return Ok(counts
            .iter()
            .map(|&count| count as f64 / n_samples as f64)
            .collect());
    };

    if priors.len() != counts.len() {
        return Err(DiscrimError::InvalidPrior(format!(
            "expected {} entries, got {}",
            counts.len(),
            priors.len()
        )));
    }

    if let Some(p) = priors.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
        return Err(DiscrimError::InvalidPrior(format!(
            "entries must be non-negative, got {}",
            p
        )));
    }

    let total: f64 = priors.iter().sum();
    if (total - 1.0).abs() > PRIOR_TOLERANCE {
        return Err(DiscrimError::InvalidPrior(format!(
            "entries must sum to 1, got {}",
            total
        )));
    }

    Ok(priors.iter().map(|p| p / total).collect())
}
