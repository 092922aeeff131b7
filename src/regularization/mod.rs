//! Covariance, precision and mean estimators.
//!
//! Every estimator works from [`Residuals`], the training rows centered on their
//! own class mean. The module provides:
//! - `pooled_variance` / `class_variance`: diagonal variances
//! - `pooled_covariance` / `sample_covariance`: classical covariance matrices
//! - `full_precision`, `thomaz_precision`, `mdeb_covariance`: invertible full-matrix forms
//! - `schafer_strimmer`: analytic shrinkage covariance and precision
//! - `pseudo_inverse`: Moore-Penrose inverse by eigenvalue truncation
//! - `tong_shrunken_mean`: Lindley-type shrinkage of a class mean
//!
//! # Examples
//!
//! ```rust
//! use discrim::regularization::{pooled_covariance, pseudo_inverse, Residuals};
//! use ndarray::array;
//!
//! let groups = vec![
//!     array![[1.0, 2.0], [2.0, 2.5], [3.0, 4.0]],
//!     array![[7.0, 1.0], [8.0, 1.5], [9.0, 3.0]],
//! ];
//! let residuals = Residuals::center(&groups).unwrap();
//! let covariance = pooled_covariance(&residuals);
//!
//! let pinv = pseudo_inverse(&covariance, 1e-8).unwrap();
//! assert_eq!(pinv.rank, 2);
//! ```

mod covariance;
mod mean;
mod pseudo_inverse;
mod shrinkage;
mod variance;

pub use covariance::{full_precision, mdeb_covariance, pooled_covariance, sample_covariance, thomaz_precision};
pub use mean::{optimal_mean_shrinkage, tong_shrunken_mean, ShrunkenMean};
pub use pseudo_inverse::{pseudo_inverse, PseudoInverse};
pub use shrinkage::{schafer_strimmer, ShrinkageEstimate};
pub use variance::{class_variance, pooled_variance};

use crate::error::{DiscrimError, Result};
use crate::{Matrix, Vector};
use ndarray::{concatenate, ArrayView2, Axis};

/// Rejects a tuning value that is negative or not finite.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        return Ok(());
    }
    Err(DiscrimError::InvalidOption {
        name,
        value,
        constraint: "must be finite and non-negative",
    })
}

/// Rejects a shrinkage intensity outside `[0, 1]`.
pub(crate) fn check_intensity(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        return Ok(());
    }
    Err(DiscrimError::InvalidOption {
        name,
        value,
        constraint: "must lie in [0, 1]",
    })
}

/// Training rows centered on their class means, one block per class.
#[derive(Clone, Debug)]
pub struct Residuals {
    means: Vec<Vector>,
    groups: Vec<Matrix>,
    scale: Vector,
}

impl Residuals {
    /// Centers each class block on its column means.
    pub fn center(groups: &[Matrix]) -> Result<Self> {
        let n_features = groups
            .first()
            .map(|g| g.ncols())
            .ok_or_else(|| DiscrimError::InvalidInput("no classes to center".to_string()))?;

        let mut scale = Vector::zeros(n_features);
        let mut means = Vec::with_capacity(groups.len());
        let mut centered = Vec::with_capacity(groups.len());

        for group in groups {
            if group.ncols() != n_features {
                return Err(DiscrimError::dimension_mismatch(
                    format!("{} features", n_features),
                    format!("{} features", group.ncols()),
                ));
            }

            let mean = group
                .mean_axis(Axis(0))
                .ok_or_else(|| DiscrimError::InvalidInput("class without rows".to_string()))?;

            for row in group.axis_iter(Axis(0)) {
                scale.zip_mut_with(&row, |s, &x| *s = s.max(x.abs()));
            }

            centered.push(group - &mean.view().insert_axis(Axis(0)));
            means.push(mean);
        }

        Ok(Self {
            means,
            groups: centered,
            scale,
        })
    }

    pub fn means(&self) -> &[Vector] {
        &self.means
    }

    pub fn groups(&self) -> &[Matrix] {
        &self.groups
    }

    pub fn n_classes(&self) -> usize {
        self.groups.len()
    }

    pub fn n_samples(&self) -> usize {
        self.groups.iter().map(|g| g.nrows()).sum()
    }

    pub fn n_features(&self) -> usize {
        self.scale.len()
    }

    /// Largest absolute raw value of each feature.
    pub fn scale(&self) -> &Vector {
        &self.scale
    }

    /// All residual rows stacked in class order.
    pub fn stacked(&self) -> Matrix {
        let views: Vec<ArrayView2<f64>> = self.groups.iter().map(|g| g.view()).collect();
        match concatenate(Axis(0), &views) {
            Ok(stacked) => stacked,
            Err(_) => Matrix::zeros((0, self.n_features())),
        }
    }
}
