//! Fitting Gaussian discriminant classifiers.
//!
//! This module provides:
//! - `DiscriminantAnalysis`: builder that estimates class means, priors and a dispersion
//!   estimate for the chosen `Strategy`
//! - `FittedModel`: the immutable result, one `ClassStatistics` per class
//! - `CovarianceRepresentation`: how a dispersion estimate is stored and applied
//! - `FitOptions`: numeric knobs of the fitting step
//!
//! # Examples
//!
//! ## Pooled covariance with a pseudo-inverse
//! ```rust
//! use discrim::{CovarianceRepresentation, DiscriminantAnalysis, Strategy};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 2.0, 0.5, 3.0],
//!     [1.5, 1.7, 0.8, 3.4],
//!     [6.0, 7.0, 5.2, 1.0],
//!     [6.4, 7.5, 4.9, 1.3]
//! ];
//! let y = ["small", "small", "large", "large"];
//!
//! let model = DiscriminantAnalysis::new(Strategy::LdaPseudo)
//!     .pinv_tolerance(1e-10)
//!     .fit_arrays(&x, &y)
//!     .unwrap();
//!
//! match model.classes()[0].covariance() {
//!     CovarianceRepresentation::PseudoInverse { rank, .. } => assert_eq!(*rank, 2),
//!     other => panic!("unexpected representation {:?}", other),
//! }
//! ```
//!
//! ## Shrunken means with fixed priors
//! ```rust
//! use discrim::{DiscriminantAnalysis, Strategy};
//! use ndarray::array;
//!
//! let x = array![[1.0], [1.4], [0.9], [3.0], [3.3], [2.8]];
//! let y = [0, 0, 0, 1, 1, 1];
//!
//! let model = DiscriminantAnalysis::new(Strategy::SmDqda)
//!     .priors(vec![0.25, 0.75])
//!     .fit_arrays(&x, &y)
//!     .unwrap();
//!
//! assert_eq!(model.labels(), vec![&0, &1]);
//! assert_eq!(model.priors()[1], 0.75);
//! ```

mod estimator;
mod fitted;
mod representation;
mod strategy;

pub use estimator::DiscriminantAnalysis;
pub use fitted::{ClassStatistics, FittedModel};
pub use representation::CovarianceRepresentation;
pub use strategy::{FitOptions, Strategy};
