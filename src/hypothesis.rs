//! The rule classifiers and the ensemble built from them.

pub(crate) mod hypothesis_traits;
pub(crate) mod rule_classifier;
pub(crate) mod partition_classifier;
pub(crate) mod rule_ensemble;


pub use hypothesis_traits::{
    RuleHypothesis,
    Target,
    Vote,
};

pub use rule_classifier::RuleClassifier;
pub use partition_classifier::PartitionClassifier;
pub use rule_ensemble::RuleEnsemble;
