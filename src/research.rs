//! This directory provides some features for experiments:
//! - A weighted, stratified k-fold splitter
//! - Internal cross validation and round selection
//! - Per-round logging of running time and accuracy

/// Defines the weighted, stratified k-fold splitter.
pub mod cross_validation;

/// Defines the internal cross validation.
pub mod internal_cv;

/// Defines a logger that runs a booster round by round.
pub mod logger;


pub use cross_validation::StratifiedWeightedFolds;
pub use internal_cv::{InternalCv, CvCurve};
pub use logger::{Logger, CurrentHypothesis};
