use crate::error::{DiscrimError, Result};
use crate::regularization::{check_intensity, check_non_negative};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which means and dispersion estimates a classifier uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Pooled diagonal variances.
    Dlda,
    /// Per-class diagonal variances.
    Dqda,
    /// Pooled diagonal variances around Tong shrunken means.
    SmDlda,
    /// Per-class diagonal variances around Tong shrunken means.
    SmDqda,
    /// Pooled full covariance, inverted exactly.
    Lda,
    /// Per-class full covariance, inverted exactly.
    Qda,
    /// Pooled Schafer-Strimmer shrinkage covariance with analytic precision.
    LdaSchafer,
    /// Moore-Penrose pseudo-inverse of the pooled covariance.
    LdaPseudo,
    /// Pooled covariance with small eigenvalues raised to their mean.
    LdaThomaz,
    /// Pooled covariance plus a trace-scaled ridge.
    Mdeb,
}

impl Strategy {
    pub const ALL: [Strategy; 10] = [
        Strategy::Dlda,
        Strategy::Dqda,
        Strategy::SmDlda,
        Strategy::SmDqda,
        Strategy::Lda,
        Strategy::Qda,
        Strategy::LdaSchafer,
        Strategy::LdaPseudo,
        Strategy::LdaThomaz,
        Strategy::Mdeb,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Dlda => "dlda",
            Strategy::Dqda => "dqda",
            Strategy::SmDlda => "sm_dlda",
            Strategy::SmDqda => "sm_dqda",
            Strategy::Lda => "lda",
            Strategy::Qda => "qda",
            Strategy::LdaSchafer => "lda_schafer",
            Strategy::LdaPseudo => "lda_pseudo",
            Strategy::LdaThomaz => "lda_thomaz",
            Strategy::Mdeb => "mdeb",
        }
    }

    /// Whether every class shares one dispersion estimate.
    pub fn is_pooled(&self) -> bool {
        !matches!(self, Strategy::Dqda | Strategy::SmDqda | Strategy::Qda)
    }

    pub fn shrinks_means(&self) -> bool {
        matches!(self, Strategy::SmDlda | Strategy::SmDqda)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Strategy {
    type Err = DiscrimError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| DiscrimError::UnknownStrategy(s.to_string()))
    }
}

/// Numeric knobs of the fitting step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Eigenvalues at or below this fraction of the largest are dropped by the
    /// pseudo-inverse.
    pub pinv_tolerance: f64,
    /// Fixed correlation shrinkage for `LdaSchafer`, in `[0, 1]`.
    pub correlation_shrinkage: Option<f64>,
    /// Fixed variance shrinkage for `LdaSchafer`, in `[0, 1]`.
    pub variance_shrinkage: Option<f64>,
    /// Fixed Tong coefficient for `SmDlda` and `SmDqda`.
    pub mean_shrinkage: Option<f64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            pinv_tolerance: 1e-8,
            correlation_shrinkage: None,
            variance_shrinkage: None,
            mean_shrinkage: None,
        }
    }
}

impl FitOptions {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("pinv_tolerance", self.pinv_tolerance)?;

        let intensities = [
            ("correlation_shrinkage", self.correlation_shrinkage),
            ("variance_shrinkage", self.variance_shrinkage),
        ];
        for (name, value) in intensities {
            if let Some(v) = value {
                check_intensity(name, v)?;
            }
        }

        if let Some(r) = self.mean_shrinkage {
            check_non_negative("mean_shrinkage", r)?;
        }

        Ok(())
    }
}
