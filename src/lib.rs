#![warn(missing_docs)]

//!
//! A crate that boosts association rules into ensemble classifiers.
//! Every algorithm picks, round after round, the pre-mined itemset
//! that best improves a weighted objective on the training set
//! and appends it to an ordered ensemble of rules.
//!
//! This crate includes the following algorithms.
//!
//! - Margin-free baselines
//!     `Lac` (one rule per itemset and class) and
//!     `Zero` (the default rule alone).
//!
//! - Weight-updating boosting
//!     `DiscreteBoost` (two classes),
//!     `ConfidenceBoost` (three confidence rules) and
//!     `Slipper` (with extra mass for unseen instances).
//!
//! - Greedy coverage
//!     `BoostCar` and `ExperimentalBoostCar`.
//!
//! The resulting `RuleEnsemble` predicts a class for every round prefix,
//! which `research::InternalCv` uses to choose a number of rounds.

pub mod constants;
pub mod sample;
pub mod hypothesis;
pub mod booster;
pub mod common;
pub mod research;
pub mod prelude;


/// A class label.
pub type Label = u32;


pub use sample::{
    Instance,
    Itemset,
    ItemsetReader,
    TrainingSet,
};

pub use hypothesis::{
    PartitionClassifier,
    RuleClassifier,
    RuleEnsemble,
    RuleHypothesis,
    Target,
    Vote,
};

pub use booster::{
    Booster,

    DiscreteBoost,
    ConfidenceBoost,
    ConfidenceRule,
    Slipper,
    BoostCar,
    ExperimentalBoostCar,
    Lac,
    Zero,
};
