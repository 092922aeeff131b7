//! Gaussian discriminant classifiers with regularized covariance estimates.
//!
//! A [`DiscriminantAnalysis`] estimator fits per-class means, priors and a
//! covariance representation chosen by a [`Strategy`], producing an immutable
//! [`FittedModel`] that scores, classifies and computes posterior probabilities.
//!
//! ```rust
//! use discrim::{Dataset, DiscriminantAnalysis, PredictMode, Prediction, Strategy};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 2.1],
//!     [1.3, 1.8],
//!     [0.8, 2.4],
//!     [5.2, 6.0],
//!     [4.9, 6.3],
//!     [5.5, 5.7]
//! ];
//! let data = Dataset::new(x, vec!["a", "a", "a", "b", "b", "b"]).unwrap();
//!
//! let model = DiscriminantAnalysis::new(Strategy::Dlda).fit(&data).unwrap();
//! let prediction = model.predict(&array![[1.1, 2.0], [5.0, 6.1]], PredictMode::Class).unwrap();
//! assert_eq!(prediction, Prediction::Classes(vec!["a", "b"]));
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod dataset;
pub mod error;
pub mod linalg;
pub mod metrics;
pub mod model;
pub mod predict;
pub mod regularization;

pub use dataset::{Dataset, Label};
pub use error::{DiscrimError, ErrorKind, Result};
pub use model::{
    ClassStatistics, CovarianceRepresentation, DiscriminantAnalysis, FitOptions, FittedModel,
    Strategy,
};
pub use predict::{PredictMode, Prediction};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
