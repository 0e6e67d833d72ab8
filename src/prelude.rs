//! Exports the boosting algorithms, the rule classifiers and the data model.
//! 
pub use crate::booster::{
    // Booster trait
    Booster,


    // Baselines --------------------------------
    Lac,
    Zero,


    // Weight-updating boostings
    DiscreteBoost,
    ConfidenceBoost,
    ConfidenceRule,
    Slipper,


    // Greedy coverage
    BoostCar,
    ExperimentalBoostCar,
};


pub use crate::hypothesis::{
    // Rule classifier trait
    RuleHypothesis,
    Target,
    Vote,

    RuleClassifier,
    PartitionClassifier,
    RuleEnsemble,
};


pub use crate::sample::{
    Itemset,
    Instance,
    TrainingSet,
    ItemsetReader,
    ItemsetFormat,
};


pub use crate::Label;
