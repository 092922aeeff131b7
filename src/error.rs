//! Error types for fitting and prediction.
//!
//! Every failure is either an input problem (the caller handed over something
//! malformed) or a numerical one (the data is degenerate for the chosen strategy).
//! [`DiscrimError::kind`] tells the two apart.

use thiserror::Error;

/// Coarse classification of a [`DiscrimError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: shapes, labels, priors, option values, mode strings.
    Input,
    /// Degenerate data for the selected strategy.
    Numerical,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DiscrimError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("no observations remain after removing rows with missing values")]
    EmptyInput,

    #[error("class {class} has {count} observation(s), at least 2 are required")]
    InsufficientObservations { class: String, count: usize },

    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    #[error("invalid prior vector: {0}")]
    InvalidPrior(String),

    #[error("unrecognized prediction mode `{0}`, expected one of: class, prob, score")]
    UnknownMode(String),

    #[error("unrecognized strategy `{0}`")]
    UnknownStrategy(String),

    #[error("invalid value {value} for {name}: {constraint}")]
    InvalidOption {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("feature {feature} has zero variance")]
    ZeroVariance { feature: usize },

    #[error("covariance matrix is singular (pivot {pivot:e} at index {index})")]
    SingularCovariance { index: usize, pivot: f64 },

    #[error("eigendecomposition did not converge after {sweeps} sweeps")]
    NoConvergence { sweeps: usize },

    #[error("posterior is undefined for row {row}: every class has zero joint density")]
    DegeneratePosterior { row: usize },
}

impl DiscrimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscrimError::ZeroVariance { .. }
            | DiscrimError::SingularCovariance { .. }
            | DiscrimError::NoConvergence { .. }
            | DiscrimError::DegeneratePosterior { .. } => ErrorKind::Numerical,
            _ => ErrorKind::Input,
        }
    }

    pub(crate) fn dimension_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        DiscrimError::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscrimError>;
