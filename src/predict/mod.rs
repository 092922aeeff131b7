//! Scoring new observations with a fitted model.
//!
//! This module provides:
//! - `FittedModel::scores`: raw discriminant scores
//! - `FittedModel::predict_classes`: arg-max decision, ties to the first class
//! - `FittedModel::predict_proba`: posterior probabilities
//! - `FittedModel::predict`: all three behind a `PredictMode`
//!
//! # Examples
//!
//! ```rust
//! use discrim::{DiscriminantAnalysis, PredictMode, Strategy};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.2], [0.3, -0.1], [-0.2, 0.1], [3.0, 3.1], [3.2, 2.7], [2.9, 3.3]];
//! let y = ["a", "a", "a", "b", "b", "b"];
//! let model = DiscriminantAnalysis::new(Strategy::LdaSchafer).fit_arrays(&x, &y).unwrap();
//!
//! let mode: PredictMode = "prob".parse().unwrap();
//! let proba = model.predict(&array![[0.1, 0.0]], mode).unwrap();
//! let proba = proba.as_matrix().unwrap();
//! assert!(proba[[0, 0]] > 0.99);
//! ```

mod posterior;
mod scorer;

use crate::dataset::Label;
use crate::error::{DiscrimError, Result};
use crate::model::FittedModel;
use crate::Matrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What [`FittedModel::predict`] returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictMode {
    /// The most likely class label per row.
    #[default]
    Class,
    /// Posterior probability of each class.
    Prob,
    /// Raw discriminant scores.
    Score,
}

impl PredictMode {
    pub fn name(&self) -> &'static str {
        match self {
            PredictMode::Class => "class",
            PredictMode::Prob => "prob",
            PredictMode::Score => "score",
        }
    }
}

impl fmt::Display for PredictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for PredictMode {
    type Err = DiscrimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "class" => Ok(PredictMode::Class),
            "prob" => Ok(PredictMode::Prob),
            "score" => Ok(PredictMode::Score),
            other => Err(DiscrimError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Prediction<L> {
    Classes(Vec<L>),
    /// `n_new × k`, columns in class order.
    Probabilities(Matrix),
    /// `n_new × k`, columns in class order.
    Scores(Matrix),
}

impl<L> Prediction<L> {
    pub fn as_classes(&self) -> Option<&[L]> {
        match self {
            Prediction::Classes(labels) => Some(labels),
            _ => None,
        }
    }

    /// The probability or score matrix.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Prediction::Probabilities(m) | Prediction::Scores(m) => Some(m),
            Prediction::Classes(_) => None,
        }
    }

    /// Number of predicted rows.
    pub fn len(&self) -> usize {
        match self {
            Prediction::Classes(labels) => labels.len(),
            Prediction::Probabilities(m) | Prediction::Scores(m) => m.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> PredictMode {
        match self {
            Prediction::Classes(_) => PredictMode::Class,
            Prediction::Probabilities(_) => PredictMode::Prob,
            Prediction::Scores(_) => PredictMode::Score,
        }
    }
}

impl<L: Label> FittedModel<L> {
    pub fn predict(&self, x: &Matrix, mode: PredictMode) -> Result<Prediction<L>> {
        match mode {
            PredictMode::Class => self.predict_classes(x).map(Prediction::Classes),
            PredictMode::Prob => self.predict_proba(x).map(Prediction::Probabilities),
            PredictMode::Score => self.scores(x).map(Prediction::Scores),
        }
    }
}
