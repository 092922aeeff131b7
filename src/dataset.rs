use crate::error::{DiscrimError, Result};
use crate::Matrix;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Anything usable as a class label.
pub trait Label: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Label for T {}

/// A finite feature matrix paired with one label per row.
///
/// Every realized class holds at least two rows. Classes are ordered by their
/// first appearance in the label vector.
#[derive(Clone, Debug)]
pub struct Dataset<L> {
    features: Matrix,
    labels: Vec<L>,
    feature_names: Vec<String>,
}

impl<L: Label> Dataset<L> {
    pub fn new(features: Matrix, labels: Vec<L>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(DiscrimError::dimension_mismatch(
                format!("{} labels", features.nrows()),
                format!("{} labels", labels.len()),
            ));
        }

        let names = default_feature_names(features.ncols());
        Self::validated(features, labels, names)
    }

    /// Builds a dataset from input that may contain missing values.
    ///
    /// Rows with a `None` label or a `NaN` feature are dropped from both sides,
    /// keeping the relative order of the remaining rows. A class that loses
    /// every row this way is reported rather than silently forgotten.
    pub fn from_incomplete(features: Matrix, labels: Vec<Option<L>>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(DiscrimError::dimension_mismatch(
                format!("{} labels", features.nrows()),
                format!("{} labels", labels.len()),
            ));
        }

        let keep: Vec<usize> = (0..features.nrows())
            .filter(|&i| labels[i].is_some() && !features.row(i).iter().any(|v| v.is_nan()))
            .collect();

        let dropped = features.nrows() - keep.len();
        if dropped > 0 {
            debug!(dropped, kept = keep.len(), "removed rows with missing values");
        }

        let names = default_feature_names(features.ncols());
        let features = features.select(Axis(0), &keep);
        let kept: Vec<L> = keep.iter().filter_map(|&i| labels[i].clone()).collect();

        if !kept.is_empty() {
            let survivors: HashSet<&L> = kept.iter().collect();
            if let Some(lost) = labels.iter().flatten().find(|l| !survivors.contains(l)) {
                return Err(DiscrimError::InsufficientObservations {
                    class: format!("{:?}", lost),
                    count: 0,
                });
            }
        }

        Self::validated(features, kept, names)
    }

    fn validated(features: Matrix, labels: Vec<L>, feature_names: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(DiscrimError::EmptyInput);
        }
        if features.ncols() == 0 {
            return Err(DiscrimError::InvalidInput(
                "feature matrix has no columns".to_string(),
            ));
        }

        if let Some(((row, column), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DiscrimError::NonFiniteValue { row, column });
        }

        let dataset = Self {
            features,
            labels,
            feature_names,
        };

        for (class, count) in dataset.class_counts() {
            if count < 2 {
                return Err(DiscrimError::InsufficientObservations {
                    class: format!("{:?}", class),
                    count,
                });
            }
        }

        Ok(dataset)
    }

    pub fn with_feature_names<S: Into<String>>(mut self, names: Vec<S>) -> Result<Self> {
        if names.len() != self.n_features() {
            return Err(DiscrimError::dimension_mismatch(
                format!("{} feature names", self.n_features()),
                format!("{} feature names", names.len()),
            ));
        }

        self.feature_names = names.into_iter().map(Into::into).collect();
        Ok(self)
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn classes(&self) -> Vec<L> {
        self.partition().into_iter().map(|(label, _)| label).collect()
    }

    pub fn class_counts(&self) -> Vec<(L, usize)> {
        self.partition()
            .into_iter()
            .map(|(label, rows)| (label, rows.len()))
            .collect()
    }

    /// Row indices of each class, classes in first-appearance order.
    pub(crate) fn partition(&self) -> Vec<(L, Vec<usize>)> {
        let mut index: HashMap<&L, usize> = HashMap::new();
        let mut groups: Vec<(L, Vec<usize>)> = Vec::new();

        for (row, label) in self.labels.iter().enumerate() {
            let slot = *index.entry(label).or_insert_with(|| {
                groups.push((label.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row);
        }

        groups
    }

    /// Sub-dataset made of the given rows, validated like a fresh dataset.
    pub fn select(&self, rows: &[usize]) -> Result<Self> {
        if let Some(&row) = rows.iter().find(|&&row| row >= self.n_samples()) {
            return Err(DiscrimError::InvalidInput(format!(
                "row index {} out of bounds for {} rows",
                row,
                self.n_samples()
            )));
        }

        let features = self.features.select(Axis(0), rows);
        let labels = rows.iter().map(|&row| self.labels[row].clone()).collect();
        Self::validated(features, labels, self.feature_names.clone())
    }

    /// Splits off the last `test_size` fraction of rows as a test set.
    ///
    /// With a seed the rows are shuffled first. Both halves must still hold at
    /// least two rows per class.
    pub fn train_test_split(&self, test_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(DiscrimError::InvalidOption {
                name: "test_size",
                value: test_size,
                constraint: "must be between 0 and 1",
            });
        }

        let n_samples = self.n_samples();
        let n_test = (n_samples as f64 * test_size).round() as usize;
        let n_train = n_samples - n_test;

        let mut rows: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = seed {
            let mut rng = StdRng::seed_from_u64(seed);
            rows.shuffle(&mut rng);
        }

        let train = self.select(&rows[..n_train])?;
        let test = self.select(&rows[n_train..])?;

        Ok((train, test))
    }
}

fn default_feature_names(n_features: usize) -> Vec<String> {
    (1..=n_features).map(|j| format!("x{}", j)).collect()
}
